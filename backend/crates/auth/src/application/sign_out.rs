//! Sign Out Use Case
//!
//! Invalidates a session. Idempotent.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Unknown or malformed tokens are a no-op.
    pub async fn execute(&self, raw_token: &str) -> AuthResult<()> {
        let Some(token) = SessionToken::parse(raw_token) else {
            return Ok(());
        };

        if self.session_repo.delete(&token).await? {
            tracing::info!("Session signed out");
        }
        Ok(())
    }
}
