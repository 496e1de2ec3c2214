//! Key-value store repository
//!
//! Layout: `beneficiary:{uuid}` →
//! `{id, status, issued_at_ms, expires_at_ms, redeemed_at_ms?, redeemed_by?}`.
//! Records carry no store TTL; terminal states must stay readable.
//! Transitions are compare-and-set on `status`; redemption is additionally
//! guarded by `expires_at_ms` against the store's clock.

use std::sync::Arc;

use kernel::id::{AccountId, BeneficiaryId};
use platform::kv::{CasOutcome, FieldMap, KvStore, StoreError, fields};

use crate::domain::entities::Beneficiary;
use crate::domain::repository::{BeneficiaryRepository, Transition};
use crate::domain::value_objects::BeneficiaryStatus;
use crate::error::RedemptionResult;

const BENEFICIARY_PREFIX: &str = "beneficiary:";
const STATUS_FIELD: &str = "status";
const EXPIRES_AT_FIELD: &str = "expires_at_ms";

pub struct KvBeneficiaryRepository<S> {
    store: Arc<S>,
}

impl<S> Clone for KvBeneficiaryRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: KvStore> KvBeneficiaryRepository<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

fn beneficiary_key(id: &BeneficiaryId) -> String {
    format!("{BENEFICIARY_PREFIX}{id}")
}

// ============================================================================
// Record mapping
// ============================================================================

fn corrupt(key: &str, field: &str) -> StoreError {
    StoreError::Corrupt(format!("{key}: invalid field `{field}`"))
}

fn to_fields(b: &Beneficiary) -> FieldMap {
    let mut record = fields([
        ("id", b.id.to_string()),
        (STATUS_FIELD, b.status.code().to_string()),
        ("issued_at_ms", b.issued_at_ms.to_string()),
        (EXPIRES_AT_FIELD, b.expires_at_ms.to_string()),
    ]);
    if let Some(at) = b.redeemed_at_ms {
        record.insert("redeemed_at_ms".to_string(), at.to_string());
    }
    if let Some(by) = b.redeemed_by {
        record.insert("redeemed_by".to_string(), by.to_string());
    }
    record
}

fn from_fields(key: &str, record: &FieldMap) -> Result<Beneficiary, StoreError> {
    let get = |field: &str| record.get(field).map(String::as_str);
    let required = |field: &str| get(field).ok_or_else(|| corrupt(key, field));
    let millis = |field: &str| -> Result<Option<i64>, StoreError> {
        get(field)
            .map(|v| v.parse::<i64>().map_err(|_| corrupt(key, field)))
            .transpose()
    };

    let id = required("id")?
        .parse::<BeneficiaryId>()
        .map_err(|_| corrupt(key, "id"))?;
    let status = BeneficiaryStatus::from_code(required(STATUS_FIELD)?)
        .ok_or_else(|| corrupt(key, STATUS_FIELD))?;
    let issued_at_ms = millis("issued_at_ms")?.ok_or_else(|| corrupt(key, "issued_at_ms"))?;
    let expires_at_ms = millis(EXPIRES_AT_FIELD)?.ok_or_else(|| corrupt(key, EXPIRES_AT_FIELD))?;
    let redeemed_at_ms = millis("redeemed_at_ms")?;
    let redeemed_by = get("redeemed_by")
        .map(|v| v.parse::<AccountId>().map_err(|_| corrupt(key, "redeemed_by")))
        .transpose()?;

    if status == BeneficiaryStatus::Redeemed && (redeemed_at_ms.is_none() || redeemed_by.is_none())
    {
        return Err(StoreError::Corrupt(format!(
            "{key}: redeemed without redeemed_at_ms/redeemed_by"
        )));
    }

    Ok(Beneficiary {
        id,
        status,
        issued_at_ms,
        expires_at_ms,
        redeemed_at_ms,
        redeemed_by,
    })
}

fn to_transition(key: &str, outcome: CasOutcome) -> Result<Transition, StoreError> {
    match outcome {
        CasOutcome::Applied => Ok(Transition::Applied),
        CasOutcome::Missing => Ok(Transition::Missing),
        CasOutcome::PastDeadline => Ok(Transition::Lost(BeneficiaryStatus::Expired)),
        CasOutcome::Mismatch(current) => BeneficiaryStatus::from_code(&current)
            .map(Transition::Lost)
            .ok_or_else(|| corrupt(key, STATUS_FIELD)),
    }
}

// ============================================================================
// BeneficiaryRepository
// ============================================================================

impl<S: KvStore + Send + Sync> BeneficiaryRepository for KvBeneficiaryRepository<S> {
    async fn find(&self, id: &BeneficiaryId) -> RedemptionResult<Option<Beneficiary>> {
        let key = beneficiary_key(id);
        let Some(record) = self.store.get_fields(&key).await? else {
            return Ok(None);
        };
        Ok(Some(from_fields(&key, &record)?))
    }

    async fn create_if_absent(&self, beneficiary: &Beneficiary) -> RedemptionResult<bool> {
        Ok(self
            .store
            .put_fields_if_absent(&beneficiary_key(&beneficiary.id), &to_fields(beneficiary), None)
            .await?)
    }

    async fn mark_redeemed(
        &self,
        id: &BeneficiaryId,
        redeemed_at_ms: i64,
        redeemed_by: &AccountId,
    ) -> RedemptionResult<Transition> {
        let key = beneficiary_key(id);
        let updates = fields([
            (STATUS_FIELD, BeneficiaryStatus::Redeemed.code().to_string()),
            ("redeemed_at_ms", redeemed_at_ms.to_string()),
            ("redeemed_by", redeemed_by.to_string()),
        ]);
        let outcome = self
            .store
            .compare_and_set(
                &key,
                STATUS_FIELD,
                BeneficiaryStatus::Active.code(),
                &updates,
                Some(EXPIRES_AT_FIELD),
            )
            .await?;

        if outcome == CasOutcome::PastDeadline {
            tracing::debug!(beneficiary_id = %id, "Redemption refused past expiry");
            return match self.mark_expired(id).await? {
                Transition::Applied => Ok(Transition::Lost(BeneficiaryStatus::Expired)),
                other => Ok(other),
            };
        }
        Ok(to_transition(&key, outcome)?)
    }

    async fn mark_expired(&self, id: &BeneficiaryId) -> RedemptionResult<Transition> {
        let key = beneficiary_key(id);
        let updates = fields([(STATUS_FIELD, BeneficiaryStatus::Expired.code())]);
        let outcome = self
            .store
            .compare_and_set(&key, STATUS_FIELD, BeneficiaryStatus::Active.code(), &updates, None)
            .await?;
        Ok(to_transition(&key, outcome)?)
    }
}
