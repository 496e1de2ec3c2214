//! Redemption Error Types
//!
//! Redemption-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Business outcomes of a scan
//! (`Redeemed`, `AlreadyRedeemed`, ...) are not errors; see
//! [`crate::domain::value_objects::Outcome`].

use auth::Role;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::StoreError;
use thiserror::Error;

use crate::domain::value_objects::BeneficiaryStatus;

/// Redemption-specific result type alias
pub type RedemptionResult<T> = Result<T, RedemptionError>;

#[derive(Debug, Error)]
pub enum RedemptionError {
    #[error("Invalid beneficiary id")]
    InvalidBeneficiaryId,

    /// Malformed, forged or superseded token
    #[error("Invalid redemption token")]
    InvalidToken,

    /// The beneficiary reached a terminal state; no token can be issued
    #[error("Beneficiary is {status}")]
    BeneficiaryClosed { status: BeneficiaryStatus },

    #[error("Role {role} is not permitted to {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RedemptionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RedemptionError::InvalidBeneficiaryId | RedemptionError::InvalidToken => {
                ErrorKind::UnprocessableEntity
            }
            RedemptionError::BeneficiaryClosed { .. } => ErrorKind::Conflict,
            RedemptionError::Forbidden { .. } => ErrorKind::Forbidden,
            RedemptionError::Store(StoreError::Unavailable(_)) => ErrorKind::ServiceUnavailable,
            RedemptionError::Store(StoreError::Timeout(_)) => ErrorKind::GatewayTimeout,
            RedemptionError::Store(StoreError::Corrupt(_)) | RedemptionError::Internal(_) => {
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
            RedemptionError::Store(StoreError::Unavailable(_)) => {
                AppError::service_unavailable("Store unavailable")
            }
            RedemptionError::Store(StoreError::Timeout(_)) => {
                AppError::gateway_timeout("Store did not respond in time")
            }
            RedemptionError::Store(StoreError::Corrupt(_)) | RedemptionError::Internal(_) => {
                AppError::internal("Internal error")
            }
            RedemptionError::InvalidBeneficiaryId => {
                AppError::unprocessable(self.to_string()).with_action("Send a UUID beneficiaryId")
            }
            RedemptionError::InvalidToken => {
                AppError::unprocessable(self.to_string()).with_action("Scan the code again")
            }
            RedemptionError::BeneficiaryClosed { .. } => AppError::conflict(self.to_string()),
            RedemptionError::Forbidden { .. } => AppError::forbidden(self.to_string()),
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            RedemptionError::Store(e) => e.log(),
            RedemptionError::Internal(msg) => {
                tracing::error!(message = %msg, "Redemption internal error");
            }
            RedemptionError::Forbidden { role, action } => {
                tracing::warn!(%role, action, "Role not permitted");
            }
            _ => {
                tracing::debug!(error = %self, "Redemption error");
            }
        }
    }
}

impl IntoResponse for RedemptionError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<RedemptionError> for AppError {
    fn from(err: RedemptionError) -> Self {
        err.log();
        err.to_app_error()
    }
}
