//! Domain Value Objects

use serde::Serialize;
use std::fmt;

/// Lifecycle of a beneficiary's code. `Redeemed` and `Expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BeneficiaryStatus {
    Active,
    Redeemed,
    Expired,
}

impl BeneficiaryStatus {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            BeneficiaryStatus::Active => "active",
            BeneficiaryStatus::Redeemed => "redeemed",
            BeneficiaryStatus::Expired => "expired",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(BeneficiaryStatus::Active),
            "redeemed" => Some(BeneficiaryStatus::Redeemed),
            "expired" => Some(BeneficiaryStatus::Expired),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, BeneficiaryStatus::Active)
    }
}

impl fmt::Display for BeneficiaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of a redemption attempt as reported to the scanning party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// This scan redeemed the code
    Redeemed,
    AlreadyRedeemed,
    Expired,
    /// Undecodable, forged, unknown or superseded token
    Invalid,
    /// The scanning role may not redeem
    Unauthorized,
}

impl Outcome {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Outcome::Redeemed => "redeemed",
            Outcome::AlreadyRedeemed => "already_redeemed",
            Outcome::Expired => "expired",
            Outcome::Invalid => "invalid",
            Outcome::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            BeneficiaryStatus::Active,
            BeneficiaryStatus::Redeemed,
            BeneficiaryStatus::Expired,
        ] {
            assert_eq!(BeneficiaryStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(BeneficiaryStatus::from_code("ACTIVE"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!BeneficiaryStatus::Active.is_terminal());
        assert!(BeneficiaryStatus::Redeemed.is_terminal());
        assert!(BeneficiaryStatus::Expired.is_terminal());
    }

    #[test]
    fn test_outcome_serializes_snake_case() {
        let json = serde_json::to_string(&Outcome::AlreadyRedeemed).unwrap();
        assert_eq!(json, "\"already_redeemed\"");
        assert_eq!(Outcome::AlreadyRedeemed.as_str(), "already_redeemed");
    }
}
