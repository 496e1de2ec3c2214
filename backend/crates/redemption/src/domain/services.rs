//! Domain Services - redemption state rules
//!
//! Pure functions; the application layer turns their answers into store
//! calls.

use crate::domain::entities::Beneficiary;
use crate::domain::value_objects::{BeneficiaryStatus, Outcome};

/// What a scan of a matching token should do to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionStep {
    /// CAS `active -> redeemed`
    Redeem,
    /// CAS `active -> expired`
    Expire,
    /// Terminal already; report without writing
    Report(Outcome),
}

pub fn plan_redemption(record: &Beneficiary, now_ms: i64) -> RedemptionStep {
    match record.status {
        BeneficiaryStatus::Redeemed => RedemptionStep::Report(Outcome::AlreadyRedeemed),
        BeneficiaryStatus::Expired => RedemptionStep::Report(Outcome::Expired),
        BeneficiaryStatus::Active if record.is_past_expiry(now_ms) => RedemptionStep::Expire,
        BeneficiaryStatus::Active => RedemptionStep::Redeem,
    }
}

/// Outcome to report when a CAS found the record in `current` instead of
/// `active`. `None` if `current` is not terminal.
pub fn outcome_after_lost_race(current: BeneficiaryStatus) -> Option<Outcome> {
    match current {
        BeneficiaryStatus::Redeemed => Some(Outcome::AlreadyRedeemed),
        BeneficiaryStatus::Expired => Some(Outcome::Expired),
        BeneficiaryStatus::Active => None,
    }
}
