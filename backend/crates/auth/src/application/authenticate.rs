//! Authenticate Use Case
//!
//! Verifies a username/password pair and opens a session.

use std::sync::Arc;

use platform::password::{ClearTextPassword, verify_decoy};

use crate::application::config::AuthConfig;
use crate::domain::entity::{account::Account, session::Session};
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::domain::value_object::{session_token::SessionToken, username::Username};
use crate::error::{AuthError, AuthResult};

pub struct AuthenticateInput {
    pub username: String,
    pub password: String,
}

pub struct AuthenticateOutput {
    /// Bearer token for the client; only its digest is stored
    pub session_token: SessionToken,
    pub session: Session,
    pub account: Account,
}

pub struct AuthenticateUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    account_repo: Arc<A>,
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<A, S> AuthenticateUseCase<A, S>
where
    A: AccountRepository,
    S: SessionRepository,
{
    pub fn new(account_repo: Arc<A>, session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            account_repo,
            session_repo,
            config,
        }
    }

    pub async fn execute(&self, input: AuthenticateInput) -> AuthResult<AuthenticateOutput> {
        let password = ClearTextPassword::for_login(input.password);

        let account = match Username::parse(&input.username) {
            Some(username) => self.account_repo.find_by_username(&username).await?,
            None => None,
        };

        let Some(account) = account else {
            // Same Argon2 cost as a real check
            verify_decoy(&password);
            return Err(AuthError::InvalidCredentials);
        };

        if !account.verify_password(&password) {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.can_login() {
            tracing::debug!(account_id = %account.id, status = %account.status, "Login on inactive account");
            return Err(AuthError::InvalidCredentials);
        }

        let session_token = SessionToken::generate();
        let session = Session::new(account.id, account.role, self.config.session_ttl_chrono());
        self.session_repo
            .create(&session_token, &session, self.config.session_ttl)
            .await?;

        tracing::info!(
            account_id = %account.id,
            role = %account.role,
            expires_at_ms = session.expires_at_ms,
            "Account signed in"
        );

        Ok(AuthenticateOutput {
            session_token,
            session,
            account,
        })
    }
}
