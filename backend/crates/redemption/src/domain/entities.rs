//! Domain Entities

use chrono::Utc;
use kernel::id::{AccountId, BeneficiaryId};

use crate::domain::token::DecodedToken;
use crate::domain::value_objects::BeneficiaryStatus;

/// Beneficiary - the subject of a redemption code
///
/// `expires_at_ms` is fixed at issuance. A `Redeemed` record always carries
/// `redeemed_at_ms` and `redeemed_by`; the repository rejects records that
/// do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beneficiary {
    pub id: BeneficiaryId,
    pub status: BeneficiaryStatus,
    /// Unix timestamp ms, also embedded in the token
    pub issued_at_ms: i64,
    /// Unix timestamp ms
    pub expires_at_ms: i64,
    pub redeemed_at_ms: Option<i64>,
    pub redeemed_by: Option<AccountId>,
}

impl Beneficiary {
    /// A fresh active record issued now
    pub fn issue(id: BeneficiaryId, ttl_ms: i64) -> Self {
        Self::issue_at(id, Utc::now().timestamp_millis(), ttl_ms)
    }

    pub fn issue_at(id: BeneficiaryId, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            id,
            status: BeneficiaryStatus::Active,
            issued_at_ms: now_ms,
            expires_at_ms: now_ms.saturating_add(ttl_ms),
            redeemed_at_ms: None,
            redeemed_by: None,
        }
    }

    #[inline]
    pub fn is_past_expiry(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// Status as a reader should see it: an active record past its expiry
    /// reads as expired even before the store has been updated.
    pub fn effective_status(&self, now_ms: i64) -> BeneficiaryStatus {
        match self.status {
            BeneficiaryStatus::Active if self.is_past_expiry(now_ms) => BeneficiaryStatus::Expired,
            status => status,
        }
    }

    /// Whether a decoded token was minted for this issuance
    pub fn matches(&self, token: &DecodedToken) -> bool {
        self.id == token.beneficiary_id && self.issued_at_ms == token.issued_at_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_expiry_from_ttl() {
        let b = Beneficiary::issue_at(BeneficiaryId::new(), 1_000, 500);
        assert_eq!(b.status, BeneficiaryStatus::Active);
        assert_eq!(b.expires_at_ms, 1_500);
        assert!(b.redeemed_at_ms.is_none() && b.redeemed_by.is_none());
    }

    #[test]
    fn test_expiry_boundary() {
        let b = Beneficiary::issue_at(BeneficiaryId::new(), 1_000, 500);
        assert!(!b.is_past_expiry(1_499));
        assert!(b.is_past_expiry(1_500));
        assert_eq!(b.effective_status(1_499), BeneficiaryStatus::Active);
        assert_eq!(b.effective_status(1_500), BeneficiaryStatus::Expired);
    }

    #[test]
    fn test_effective_status_keeps_terminal_states() {
        let mut b = Beneficiary::issue_at(BeneficiaryId::new(), 1_000, 500);
        b.status = BeneficiaryStatus::Redeemed;
        assert_eq!(b.effective_status(9_999), BeneficiaryStatus::Redeemed);
    }

    #[test]
    fn test_matches_requires_same_issuance() {
        let b = Beneficiary::issue_at(BeneficiaryId::new(), 1_000, 500);
        let same = DecodedToken { beneficiary_id: b.id, issued_at_ms: 1_000 };
        let stale = DecodedToken { beneficiary_id: b.id, issued_at_ms: 999 };
        let other = DecodedToken { beneficiary_id: BeneficiaryId::new(), issued_at_ms: 1_000 };
        assert!(b.matches(&same));
        assert!(!b.matches(&stale));
        assert!(!b.matches(&other));
    }
}
