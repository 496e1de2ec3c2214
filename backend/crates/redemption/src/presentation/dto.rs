//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{BeneficiaryStatus, Outcome};

/// Request for POST /api/redeem and POST /api/redeem/inspect
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

/// Response for POST /api/redeem
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemResponse {
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<i64>,
    /// Whether the caller's account made the redemption. Lets a scanner
    /// retrying after a lost response recognise its own success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_by_you: Option<bool>,
}

/// Response for POST /api/redeem/inspect
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    pub beneficiary_id: String,
    pub status: BeneficiaryStatus,
    pub issued_at: i64,
    pub expires_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeemed_at: Option<i64>,
}

/// Request for POST /api/issue
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    pub beneficiary_id: String,
}

/// Response for POST /api/issue
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueResponse {
    pub beneficiary_id: String,
    pub token: String,
    pub url: String,
    pub issued_at: i64,
    pub expires_at: i64,
}
