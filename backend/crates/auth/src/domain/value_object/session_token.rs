//! Session Token Value Object
//!
//! Opaque bearer credential: 32 random bytes, base64url without padding
//! (43 characters). The store only ever sees `sha256(token)` in hex, so a
//! leaked store dump does not yield usable tokens.

use std::fmt;

use platform::crypto::{from_base64url, random_array, sha256_hex, to_base64url};

const TOKEN_BYTES: usize = 32;
const ENCODED_LEN: usize = 43;

#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        Self(to_base64url(&random_array::<TOKEN_BYTES>()))
    }

    /// Accepts only well-formed tokens, so malformed input never reaches the store.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() != ENCODED_LEN {
            return None;
        }
        let bytes = from_base64url(raw).ok()?;
        (bytes.len() == TOKEN_BYTES).then(|| Self(raw.to_string()))
    }

    /// Hex SHA-256 digest used in the storage key
    pub fn digest(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }

    /// The value handed to the client
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([REDACTED])")
    }
}
