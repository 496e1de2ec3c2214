//! Redeem Use Case
//!
//! Decides the outcome of one scan. The store CAS is the only ordering
//! primitive: whichever process applies `active -> redeemed` first wins, and
//! every loser reports the winner's state.

use std::sync::Arc;

use auth::Account;
use chrono::Utc;
use kernel::id::{AccountId, BeneficiaryId};

use crate::domain::repository::{BeneficiaryRepository, Transition};
use crate::domain::services::{RedemptionStep, outcome_after_lost_race, plan_redemption};
use crate::domain::token::TokenCodec;
use crate::domain::value_objects::{BeneficiaryStatus, Outcome};
use crate::error::{RedemptionError, RedemptionResult};

pub struct RedeemInput {
    pub token: String,
    /// The signed-in scanning party
    pub actor: Account,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemOutput {
    pub outcome: Outcome,
    /// Set for every outcome except `Invalid`
    pub beneficiary_id: Option<BeneficiaryId>,
    /// Set for `Redeemed` and `AlreadyRedeemed`
    pub redeemed_at_ms: Option<i64>,
    /// The account that redeemed, with `redeemed_at_ms`
    pub redeemed_by: Option<AccountId>,
}

impl RedeemOutput {
    fn invalid() -> Self {
        Self {
            outcome: Outcome::Invalid,
            beneficiary_id: None,
            redeemed_at_ms: None,
            redeemed_by: None,
        }
    }

    fn of(outcome: Outcome, id: BeneficiaryId) -> Self {
        Self {
            outcome,
            beneficiary_id: Some(id),
            redeemed_at_ms: None,
            redeemed_by: None,
        }
    }
}

pub struct RedeemUseCase<B>
where
    B: BeneficiaryRepository,
{
    repo: Arc<B>,
    codec: TokenCodec,
}

impl<B> RedeemUseCase<B>
where
    B: BeneficiaryRepository,
{
    pub fn new(repo: Arc<B>, codec: TokenCodec) -> Self {
        Self { repo, codec }
    }

    pub async fn execute(&self, input: RedeemInput) -> RedemptionResult<RedeemOutput> {
        let actor = input.actor;

        let Some(decoded) = self.codec.decode(&input.token) else {
            tracing::info!(account_id = %actor.id, "Undecodable token scanned");
            return Ok(RedeemOutput::invalid());
        };
        let id = decoded.beneficiary_id;

        // A superseded issuance reads the same as an unknown beneficiary
        let record = match self.repo.find(&id).await? {
            Some(record) if record.matches(&decoded) => record,
            _ => {
                tracing::info!(
                    beneficiary_id = %id,
                    account_id = %actor.id,
                    "Token does not resolve"
                );
                return Ok(RedeemOutput::invalid());
            }
        };

        if !actor.role.can_redeem() {
            tracing::warn!(
                beneficiary_id = %id,
                account_id = %actor.id,
                role = %actor.role,
                "Redemption by unauthorized role"
            );
            return Ok(RedeemOutput::of(Outcome::Unauthorized, id));
        }

        let now_ms = Utc::now().timestamp_millis();
        let (outcome, redemption) = match plan_redemption(&record, now_ms) {
            RedemptionStep::Report(Outcome::AlreadyRedeemed) => {
                (Outcome::AlreadyRedeemed, record.redeemed_at_ms.zip(record.redeemed_by))
            }
            RedemptionStep::Report(outcome) => (outcome, None),
            RedemptionStep::Redeem => match self.repo.mark_redeemed(&id, now_ms, &actor.id).await? {
                Transition::Applied => (Outcome::Redeemed, Some((now_ms, actor.id))),
                Transition::Lost(BeneficiaryStatus::Redeemed) => {
                    (Outcome::AlreadyRedeemed, self.winner(&id).await?)
                }
                lost => (outcome_of_lost_race(&id, lost)?, None),
            },
            RedemptionStep::Expire => match self.repo.mark_expired(&id).await? {
                Transition::Applied => (Outcome::Expired, None),
                lost => (outcome_of_lost_race(&id, lost)?, None),
            },
        };

        tracing::info!(
            beneficiary_id = %id,
            account_id = %actor.id,
            outcome = %outcome,
            "Redemption attempt"
        );

        if outcome == Outcome::Invalid {
            return Ok(RedeemOutput::invalid());
        }
        Ok(RedeemOutput {
            redeemed_at_ms: redemption.map(|(at, _)| at),
            redeemed_by: redemption.map(|(_, by)| by),
            ..RedeemOutput::of(outcome, id)
        })
    }

    /// When and by whom a concurrent scan redeemed `id`
    async fn winner(&self, id: &BeneficiaryId) -> RedemptionResult<Option<(i64, AccountId)>> {
        Ok(self
            .repo
            .find(id)
            .await?
            .and_then(|record| record.redeemed_at_ms.zip(record.redeemed_by)))
    }
}

fn outcome_of_lost_race(id: &BeneficiaryId, transition: Transition) -> RedemptionResult<Outcome> {
    match transition {
        Transition::Lost(current) => outcome_after_lost_race(current).ok_or_else(|| {
            RedemptionError::Internal(format!("CAS on {id} reported status {current}"))
        }),
        // Deleted between the read and the CAS
        Transition::Missing => Ok(Outcome::Invalid),
        Transition::Applied => Err(RedemptionError::Internal(format!(
            "CAS on {id} applied but reported as lost"
        ))),
    }
}
