//! Issue Use Case
//!
//! Idempotent: the first call creates the active record, later calls reuse
//! it and therefore return the same token.

use std::sync::Arc;

use auth::Account;
use chrono::Utc;
use kernel::id::BeneficiaryId;

use crate::application::config::RedemptionConfig;
use crate::application::public_url;
use crate::domain::entities::Beneficiary;
use crate::domain::repository::{BeneficiaryRepository, Transition};
use crate::domain::value_objects::BeneficiaryStatus;
use crate::error::{RedemptionError, RedemptionResult};

pub struct IssueInput {
    pub beneficiary_id: BeneficiaryId,
    pub actor: Account,
    /// Origin of the issuing request, used when no public base URL is configured
    pub request_origin: Option<String>,
}

#[derive(Debug, Clone)]
pub struct IssueOutput {
    pub token: String,
    pub url: String,
    pub beneficiary: Beneficiary,
    /// Whether this call created the record
    pub created: bool,
}

pub struct IssueUseCase<B>
where
    B: BeneficiaryRepository,
{
    repo: Arc<B>,
    config: Arc<RedemptionConfig>,
}

impl<B> IssueUseCase<B>
where
    B: BeneficiaryRepository,
{
    pub fn new(repo: Arc<B>, config: Arc<RedemptionConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, input: IssueInput) -> RedemptionResult<IssueOutput> {
        let IssueInput {
            beneficiary_id: id,
            actor,
            request_origin,
        } = input;

        if !actor.role.can_issue() {
            return Err(RedemptionError::Forbidden {
                role: actor.role,
                action: "issue tokens",
            });
        }

        let candidate = Beneficiary::issue(id, self.config.beneficiary_ttl_ms());
        let created = self.repo.create_if_absent(&candidate).await?;
        let record = if created {
            candidate
        } else {
            self.repo
                .find(&id)
                .await?
                .ok_or_else(|| RedemptionError::Internal(format!("{id} vanished after create")))?
        };

        if record.status.is_terminal() {
            return Err(RedemptionError::BeneficiaryClosed {
                status: record.status,
            });
        }
        if record.is_past_expiry(Utc::now().timestamp_millis()) {
            let status = match self.repo.mark_expired(&id).await? {
                Transition::Lost(status) => status,
                Transition::Applied | Transition::Missing => BeneficiaryStatus::Expired,
            };
            return Err(RedemptionError::BeneficiaryClosed { status });
        }

        let token = self.config.codec().encode(&id, record.issued_at_ms);
        let base = public_url::resolve(
            self.config.public_base_url.as_deref(),
            request_origin.as_deref(),
        );
        let url = public_url::redeem_link(base.as_deref(), &self.config.redeem_path, &token);

        tracing::info!(
            beneficiary_id = %id,
            account_id = %actor.id,
            created,
            expires_at_ms = record.expires_at_ms,
            "Issued redemption token"
        );

        Ok(IssueOutput {
            token,
            url,
            beneficiary: record,
            created,
        })
    }
}
