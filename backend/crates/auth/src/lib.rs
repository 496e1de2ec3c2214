//! Auth (Session Manager) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Accounts, sessions, roles, repository traits
//! - `application/` - Authenticate, validate and sign-out use cases
//! - `infra/` - Key-value store implementation of the repositories
//! - `presentation/` - HTTP handlers, DTOs, router, session middleware
//!
//! ## Security Model
//! - Credentials hashed with Argon2id; unknown users pay a decoy verification
//! - Opaque 256-bit bearer tokens; only their SHA-256 digest reaches the store
//! - Sessions carry a store TTL and an explicit `expires_at` check, and are
//!   never renewed implicitly
//! - Every failure mode of login and of session lookup collapses into a
//!   single error so callers learn nothing about which check failed

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::entity::{account::Account, session::Session};
pub use domain::value_object::{
    account_status::AccountStatus, role::Role, session_token::SessionToken,
};
pub use error::{AuthError, AuthResult};
pub use infra::kv::KvAuthRepository;
pub use presentation::middleware::{CurrentAccount, require_session};
pub use presentation::handlers::AuthAppState;
pub use presentation::router::auth_routes;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
