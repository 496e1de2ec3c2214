//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::StoreError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown user, wrong password or disabled account
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown, expired or orphaned session
    #[error("Session not found or expired")]
    SessionInvalid,

    /// No bearer token on a protected route
    #[error("Authentication required")]
    MissingCredentials,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::MissingCredentials => ErrorKind::Unauthorized,
            AuthError::Store(StoreError::Unavailable(_)) => ErrorKind::ServiceUnavailable,
            AuthError::Store(StoreError::Timeout(_)) => ErrorKind::GatewayTimeout,
            AuthError::Store(StoreError::Corrupt(_)) | AuthError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Client-facing error; infrastructure details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Store(StoreError::Unavailable(_)) => {
                AppError::service_unavailable("Store unavailable")
            }
            AuthError::Store(StoreError::Timeout(_)) => {
                AppError::gateway_timeout("Store did not respond in time")
            }
            AuthError::Store(StoreError::Corrupt(_)) | AuthError::Internal(_) => {
                AppError::internal("Internal error")
            }
            AuthError::InvalidCredentials => {
                AppError::unauthorized(self.to_string()).with_action("Check username and password")
            }
            AuthError::SessionInvalid | AuthError::MissingCredentials => {
                AppError::unauthorized(self.to_string()).with_action("Sign in again")
            }
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            AuthError::Store(e) => e.log(),
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let unauthorized = self.kind() == ErrorKind::Unauthorized;
        let mut response = self.to_app_error().into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        err.log();
        err.to_app_error()
    }
}
