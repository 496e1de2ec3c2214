//! Inspect Use Case
//!
//! Read-only preview of a scanned token. Never writes, so an active record
//! past its expiry is reported as expired without being transitioned.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entities::Beneficiary;
use crate::domain::repository::BeneficiaryRepository;
use crate::domain::token::TokenCodec;
use crate::domain::value_objects::BeneficiaryStatus;
use crate::error::{RedemptionError, RedemptionResult};

#[derive(Debug, Clone)]
pub struct InspectOutput {
    pub beneficiary: Beneficiary,
    /// Status as of now
    pub status: BeneficiaryStatus,
}

pub struct InspectUseCase<B>
where
    B: BeneficiaryRepository,
{
    repo: Arc<B>,
    codec: TokenCodec,
}

impl<B> InspectUseCase<B>
where
    B: BeneficiaryRepository,
{
    pub fn new(repo: Arc<B>, codec: TokenCodec) -> Self {
        Self { repo, codec }
    }

    pub async fn execute(&self, token: &str) -> RedemptionResult<InspectOutput> {
        let decoded = self.codec.decode(token).ok_or(RedemptionError::InvalidToken)?;

        let beneficiary = self
            .repo
            .find(&decoded.beneficiary_id)
            .await?
            .filter(|record| record.matches(&decoded))
            .ok_or(RedemptionError::InvalidToken)?;

        let status = beneficiary.effective_status(Utc::now().timestamp_millis());
        Ok(InspectOutput {
            beneficiary,
            status,
        })
    }
}
