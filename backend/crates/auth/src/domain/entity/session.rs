//! Session Entity
//!
//! Server-side record behind a bearer token. The token itself is not part of
//! the entity; the repository keys the record by the token's digest.

use chrono::{Duration, Utc};
use kernel::id::AccountId;

use crate::domain::value_object::role::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account_id: AccountId,
    /// Role at sign-in; a later role change invalidates the session
    pub role: Role,
    /// Unix timestamp ms
    pub created_at_ms: i64,
    /// Unix timestamp ms, fixed at creation
    pub expires_at_ms: i64,
}

impl Session {
    /// TTL is provided by the application layer (config), not hard-coded here.
    pub fn new(account_id: AccountId, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            account_id,
            role,
            created_at_ms: now.timestamp_millis(),
            expires_at_ms: (now + ttl).timestamp_millis(),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp_millis())
    }

    #[inline]
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }
}
