//! Redemption token codec
//!
//! Wire form: `v1.<payload>.<tag>`, both parts unpadded base64url.
//!
//! - `payload` = beneficiary UUID (16 bytes) ‖ `issued_at_ms` (i64 big-endian)
//! - `tag` = first 16 bytes of `HMAC-SHA256(secret, "v1" ‖ payload)`
//!
//! Encoding is deterministic: the same issuance always yields the same token,
//! which is what makes issuance idempotent.

use std::fmt;

use kernel::id::BeneficiaryId;
use platform::crypto::{constant_time_eq, from_base64url, hmac_sha256, to_base64url};

pub const VERSION: &str = "v1";

const ID_LEN: usize = 16;
const PAYLOAD_LEN: usize = ID_LEN + 8;
const TAG_LEN: usize = 16;

/// Length of every v1 token
pub const TOKEN_LEN: usize = 58;

/// What a genuine token says
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedToken {
    pub beneficiary_id: BeneficiaryId,
    pub issued_at_ms: i64,
}

/// Encodes and verifies tokens under one server secret
#[derive(Clone)]
pub struct TokenCodec {
    secret: [u8; 32],
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec").finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    pub fn encode(&self, beneficiary_id: &BeneficiaryId, issued_at_ms: i64) -> String {
        let payload = payload(beneficiary_id, issued_at_ms);
        let tag = self.tag(&payload);
        format!("{VERSION}.{}.{}", to_base64url(&payload), to_base64url(&tag))
    }

    /// `None` for anything that is not a genuine token under this secret.
    pub fn decode(&self, token: &str) -> Option<DecodedToken> {
        let token = token.trim();
        if token.len() != TOKEN_LEN {
            return None;
        }

        let mut parts = token.split('.');
        let (Some(version), Some(payload_b64), Some(tag_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return None;
        };
        if version != VERSION {
            return None;
        }

        let payload: [u8; PAYLOAD_LEN] = from_base64url(payload_b64).ok()?.try_into().ok()?;
        let tag = from_base64url(tag_b64).ok()?;
        if tag.len() != TAG_LEN || !constant_time_eq(&self.tag(&payload), &tag) {
            return None;
        }

        let (id_bytes, issued_bytes) = payload.split_at(ID_LEN);
        Some(DecodedToken {
            beneficiary_id: BeneficiaryId::from_bytes(id_bytes.try_into().ok()?),
            issued_at_ms: i64::from_be_bytes(issued_bytes.try_into().ok()?),
        })
    }

    fn tag(&self, payload: &[u8]) -> [u8; TAG_LEN] {
        let mac = hmac_sha256(&self.secret, &[VERSION.as_bytes(), payload]);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&mac[..TAG_LEN]);
        tag
    }
}

fn payload(beneficiary_id: &BeneficiaryId, issued_at_ms: i64) -> [u8; PAYLOAD_LEN] {
    let mut payload = [0u8; PAYLOAD_LEN];
    payload[..ID_LEN].copy_from_slice(beneficiary_id.as_bytes());
    payload[ID_LEN..].copy_from_slice(&issued_at_ms.to_be_bytes());
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new([7u8; 32])
    }

    #[test]
    fn test_roundtrip() {
        let id = BeneficiaryId::new();
        let token = codec().encode(&id, 1_700_000_000_123);
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.starts_with("v1."));

        let decoded = codec().decode(&token).unwrap();
        assert_eq!(decoded.beneficiary_id, id);
        assert_eq!(decoded.issued_at_ms, 1_700_000_000_123);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let id = BeneficiaryId::new();
        assert_eq!(codec().encode(&id, 42), codec().encode(&id, 42));
        assert_ne!(codec().encode(&id, 42), codec().encode(&id, 43));
    }

    #[test]
    fn test_surrounding_whitespace_is_tolerated() {
        let id = BeneficiaryId::new();
        let token = codec().encode(&id, 42);
        assert!(codec().decode(&format!(" {token}\n")).is_some());
    }

    #[test]
    fn test_any_single_altered_character_is_rejected() {
        let token = codec().encode(&BeneficiaryId::new(), 1_700_000_000_000);
        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let altered = String::from_utf8(bytes).unwrap();
            assert!(codec().decode(&altered).is_none(), "position {i} accepted");
        }
    }

    #[test]
    fn test_other_secret_is_rejected() {
        let token = codec().encode(&BeneficiaryId::new(), 42);
        assert!(TokenCodec::new([8u8; 32]).decode(&token).is_none());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let token = codec().encode(&BeneficiaryId::new(), 42);
        let v2 = token.replacen("v1.", "v2.", 1);
        assert!(codec().decode(&v2).is_none());
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let token = codec().encode(&BeneficiaryId::new(), 42);
        let cases = [
            String::new(),
            "v1".to_string(),
            "v1..".to_string(),
            token[..TOKEN_LEN - 1].to_string(),
            format!("{token}A"),
            token.replace('.', "!"),
            "x".repeat(TOKEN_LEN),
            ".".repeat(TOKEN_LEN),
            "é".repeat(TOKEN_LEN / 2),
        ];
        for case in cases {
            assert!(codec().decode(&case).is_none(), "accepted {case:?}");
        }
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", codec()).contains('7'));
    }
}
