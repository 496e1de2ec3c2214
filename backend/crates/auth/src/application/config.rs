//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Lifetime of a session from sign-in; never extended
    pub session_ttl: Duration,
    /// Store key prefix for session records
    pub session_key_prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(3600), // 1 hour
            session_key_prefix: "session:".to_string(),
        }
    }
}

impl AuthConfig {
    /// Shorter sessions for local development
    pub fn development() -> Self {
        Self {
            session_ttl: Duration::from_secs(15 * 60),
            ..Default::default()
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Session TTL as a chrono duration for entity construction
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or(chrono::Duration::MAX)
    }
}
