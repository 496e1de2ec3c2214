pub mod account_status;
pub mod role;
pub mod session_token;
pub mod username;
