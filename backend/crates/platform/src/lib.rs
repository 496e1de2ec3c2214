//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the redemption service:
//! - Cryptographic utilities (SHA-256, HMAC, Base64url)
//! - Credential hashing (Argon2id)
//! - Request header helpers (bearer token, request origin)
//! - Key-value store protocol with Redis and in-memory backends

pub mod client;
pub mod crypto;
pub mod kv;
pub mod password;
