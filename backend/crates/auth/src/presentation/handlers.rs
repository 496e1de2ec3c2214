//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use std::sync::Arc;

use platform::client::bearer_token;

use crate::application::config::AuthConfig;
use crate::application::{AuthenticateInput, AuthenticateUseCase, SignOutUseCase};
use crate::domain::repository::{AccountRepository, SessionRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{AccountView, LoginRequest, LoginResponse};
use crate::presentation::middleware::CurrentAccount;

/// Shared state for auth handlers and the session middleware
pub struct AuthAppState<R>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R> AuthAppState<R>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AuthConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            config: Arc::new(config),
        }
    }
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        AuthenticateUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(AuthenticateInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        session_token: output.session_token.expose().to_string(),
        expires_at: output.session.expires_at_ms,
        account: AccountView::from(&output.account),
    }))
}

/// POST /api/auth/logout
///
/// Always 204 unless the store fails; signing out twice is fine.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + SessionRepository + Clone + Send + Sync + 'static,
{
    if let Some(token) = bearer_token(&headers) {
        SignOutUseCase::new(state.repo.clone()).execute(token).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(Extension(CurrentAccount(account)): Extension<CurrentAccount>) -> Json<AccountView> {
    Json(AccountView::from(&account))
}
