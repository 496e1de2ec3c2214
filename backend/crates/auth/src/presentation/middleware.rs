//! Auth Middleware
//!
//! Resolves the bearer session on protected routes and hands the account to
//! downstream handlers through request extensions.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use platform::client::bearer_token;

use crate::application::ValidateSessionUseCase;
use crate::domain::entity::account::Account;
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// The signed-in account, inserted by [`require_session`]
#[derive(Debug, Clone)]
pub struct CurrentAccount(pub Account);

/// Middleware that requires a valid bearer session
///
/// Mount with `axum::middleware::from_fn_with_state(state, require_session::<R>)`.
pub async fn require_session<R>(
    State(state): State<AuthAppState<R>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let token = bearer_token(req.headers())
        .ok_or(AuthError::MissingCredentials)?
        .to_string();

    let account = ValidateSessionUseCase::new(state.repo.clone(), state.repo.clone())
        .execute(&token)
        .await?;

    tracing::debug!(account_id = %account.id, role = %account.role, "Session validated");
    req.extensions_mut().insert(CurrentAccount(account));

    Ok(next.run(req).await)
}
