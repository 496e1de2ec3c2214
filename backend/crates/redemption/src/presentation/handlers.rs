//! HTTP Handlers
//!
//! All routes sit behind `auth::require_session`, which puts the signed-in
//! account into the request extensions.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};
use std::sync::Arc;

use auth::CurrentAccount;
use kernel::id::BeneficiaryId;
use platform::client::request_origin;

use crate::application::config::RedemptionConfig;
use crate::application::{InspectUseCase, IssueInput, IssueUseCase, RedeemInput, RedeemUseCase};
use crate::domain::repository::BeneficiaryRepository;
use crate::domain::token::TokenCodec;
use crate::domain::value_objects::Outcome;
use crate::error::{RedemptionError, RedemptionResult};
use crate::presentation::dto::{
    InspectResponse, IssueRequest, IssueResponse, RedeemResponse, TokenRequest,
};

/// Shared state for redemption handlers
pub struct RedemptionAppState<B>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<B>,
    pub config: Arc<RedemptionConfig>,
    pub codec: TokenCodec,
}

impl<B> Clone for RedemptionAppState<B>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            config: self.config.clone(),
            codec: self.codec.clone(),
        }
    }
}

impl<B> RedemptionAppState<B>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: B, config: RedemptionConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            codec: config.codec(),
            config: Arc::new(config),
        }
    }
}

fn outcome_status(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Redeemed | Outcome::AlreadyRedeemed | Outcome::Expired => StatusCode::OK,
        Outcome::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        Outcome::Unauthorized => StatusCode::FORBIDDEN,
    }
}

/// POST /api/redeem
///
/// Every outcome carries a body; the status code separates business
/// outcomes (200) from rejected scans (422, 403).
pub async fn redeem<B>(
    State(state): State<RedemptionAppState<B>>,
    Extension(CurrentAccount(actor)): Extension<CurrentAccount>,
    Json(req): Json<TokenRequest>,
) -> RedemptionResult<(StatusCode, Json<RedeemResponse>)>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    let actor_id = actor.id;
    let output = RedeemUseCase::new(state.repo.clone(), state.codec.clone())
        .execute(RedeemInput {
            token: req.token,
            actor,
        })
        .await?;

    Ok((
        outcome_status(output.outcome),
        Json(RedeemResponse {
            outcome: output.outcome,
            beneficiary_id: output.beneficiary_id.map(|id| id.to_string()),
            redeemed_at: output.redeemed_at_ms,
            redeemed_by_you: output.redeemed_by.map(|by| by == actor_id),
        }),
    ))
}

/// POST /api/redeem/inspect
pub async fn inspect<B>(
    State(state): State<RedemptionAppState<B>>,
    Json(req): Json<TokenRequest>,
) -> RedemptionResult<Json<InspectResponse>>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    let output = InspectUseCase::new(state.repo.clone(), state.codec.clone())
        .execute(&req.token)
        .await?;

    Ok(Json(InspectResponse {
        beneficiary_id: output.beneficiary.id.to_string(),
        status: output.status,
        issued_at: output.beneficiary.issued_at_ms,
        expires_at: output.beneficiary.expires_at_ms,
        redeemed_at: output.beneficiary.redeemed_at_ms,
    }))
}

/// POST /api/issue
pub async fn issue<B>(
    State(state): State<RedemptionAppState<B>>,
    Extension(CurrentAccount(actor)): Extension<CurrentAccount>,
    headers: HeaderMap,
    Json(req): Json<IssueRequest>,
) -> RedemptionResult<Json<IssueResponse>>
where
    B: BeneficiaryRepository + Clone + Send + Sync + 'static,
{
    let beneficiary_id = req
        .beneficiary_id
        .parse::<BeneficiaryId>()
        .map_err(|_| RedemptionError::InvalidBeneficiaryId)?;

    let output = IssueUseCase::new(state.repo.clone(), state.config.clone())
        .execute(IssueInput {
            beneficiary_id,
            actor,
            request_origin: request_origin(&headers),
        })
        .await?;

    Ok(Json(IssueResponse {
        beneficiary_id: beneficiary_id.to_string(),
        token: output.token,
        url: output.url,
        issued_at: output.beneficiary.issued_at_ms,
        expires_at: output.beneficiary.expires_at_ms,
    }))
}
