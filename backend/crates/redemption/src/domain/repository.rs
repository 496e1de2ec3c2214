//! Repository Traits (Interfaces)
//!
//! These traits define the contract for data persistence.
//! Implementations are in the infrastructure layer.

use kernel::id::{AccountId, BeneficiaryId};

use crate::domain::entities::Beneficiary;
use crate::domain::value_objects::BeneficiaryStatus;
use crate::error::RedemptionResult;

/// Result of an atomic `active -> terminal` transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// This call made the change
    Applied,
    /// The record was no longer active; carries what it was
    Lost(BeneficiaryStatus),
    Missing,
}

#[trait_variant::make(BeneficiaryRepository: Send)]
pub trait LocalBeneficiaryRepository {
    async fn find(&self, id: &BeneficiaryId) -> RedemptionResult<Option<Beneficiary>>;

    /// Store `beneficiary` unless a record already exists. Returns whether it was stored.
    async fn create_if_absent(&self, beneficiary: &Beneficiary) -> RedemptionResult<bool>;

    /// `active -> redeemed`, recording when and by whom.
    ///
    /// Refused once `expires_at_ms` has passed on the store's clock; the
    /// record is then moved to `expired` and `Lost(Expired)` is returned.
    async fn mark_redeemed(
        &self,
        id: &BeneficiaryId,
        redeemed_at_ms: i64,
        redeemed_by: &AccountId,
    ) -> RedemptionResult<Transition>;

    /// `active -> expired`
    async fn mark_expired(&self, id: &BeneficiaryId) -> RedemptionResult<Transition>;
}
