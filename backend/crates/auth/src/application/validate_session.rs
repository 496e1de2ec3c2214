//! Validate Session Use Case
//!
//! Resolves a bearer token to the account behind it.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};

pub struct ValidateSessionUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
}

impl<A, S> ValidateSessionUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(account_repo: Arc<A>, session_repo: Arc<S>) -> Self {
        Self {
            account_repo,
            session_repo,
        }
    }

    /// Every failure except store errors is [`AuthError::SessionInvalid`].
    /// Validation never extends the session.
    pub async fn execute(&self, raw_token: &str) -> AuthResult<Account> {
        let token = SessionToken::parse(raw_token).ok_or(AuthError::SessionInvalid)?;

        let session = self
            .session_repo
            .find(&token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        // The store TTL is a backstop; expires_at is authoritative
        if session.is_expired() {
            self.session_repo.delete(&token).await?;
            return Err(AuthError::SessionInvalid);
        }

        let account = self
            .account_repo
            .find_by_id(&session.account_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !account.can_login() || account.role != session.role {
            tracing::debug!(account_id = %account.id, "Session no longer matches account");
            self.session_repo.delete(&token).await?;
            return Err(AuthError::SessionInvalid);
        }

        Ok(account)
    }
}
