//! Application Configuration
//!
//! Configuration for the redemption application layer.

use std::time::Duration;

use platform::crypto::random_array;

use crate::domain::token::TokenCodec;

/// Redemption application configuration
#[derive(Clone)]
pub struct RedemptionConfig {
    /// HMAC key for token tags (32 bytes)
    pub token_secret: [u8; 32],
    /// Lifetime of an issued code, fixed at issuance
    pub beneficiary_ttl: Duration,
    /// Base for redeem links; falls back to the request origin when unset
    pub public_base_url: Option<String>,
    /// Path of the scan page the link points to
    pub redeem_path: String,
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            token_secret: [0u8; 32],
            beneficiary_ttl: Duration::from_secs(30 * 24 * 3600),
            public_base_url: None,
            redeem_path: "/scan".to_string(),
        }
    }
}

impl std::fmt::Debug for RedemptionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedemptionConfig")
            .field("beneficiary_ttl", &self.beneficiary_ttl)
            .field("public_base_url", &self.public_base_url)
            .field("redeem_path", &self.redeem_path)
            .finish_non_exhaustive()
    }
}

impl RedemptionConfig {
    /// Create config with a random token secret (for development).
    /// Tokens do not survive a restart.
    pub fn development() -> Self {
        Self {
            token_secret: random_array(),
            ..Default::default()
        }
    }

    pub fn with_token_secret(mut self, secret: [u8; 32]) -> Self {
        self.token_secret = secret;
        self
    }

    pub fn with_beneficiary_ttl(mut self, ttl: Duration) -> Self {
        self.beneficiary_ttl = ttl;
        self
    }

    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    pub fn beneficiary_ttl_ms(&self) -> i64 {
        i64::try_from(self.beneficiary_ttl.as_millis()).unwrap_or(i64::MAX)
    }

    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(self.token_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RedemptionConfig::default();
        assert_eq!(config.beneficiary_ttl_ms(), 30 * 24 * 3600 * 1000);
        assert_eq!(config.redeem_path, "/scan");
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn test_development_secret_is_random() {
        let a = RedemptionConfig::development();
        let b = RedemptionConfig::development();
        assert_ne!(a.token_secret, b.token_secret);
    }

    #[test]
    fn test_debug_hides_secret() {
        let config = RedemptionConfig::default().with_token_secret([9u8; 32]);
        assert!(!format!("{config:?}").contains("token_secret"));
    }
}
