//! Username Value Object
//!
//! The login handle and the store key suffix of an account
//! (`account:{username}`).
//!
//! Input is NFKC-normalized, trimmed and lowercased before validation, so
//! `"ShopA"` and `"shopa"` name the same account. Allowed: ASCII
//! letters, digits and `_ . -`, 3 to 50 characters.

use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-'];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// `None` if the input cannot be a username after normalization.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw.nfkc().collect::<String>().trim().to_lowercase();

        let len = normalized.chars().count();
        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len) {
            return None;
        }
        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
        {
            return None;
        }
        if !normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
            return None;
        }

        Some(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_form() {
        assert_eq!(Username::parse("  ShopA ").unwrap().as_str(), "shopa");
        // Fullwidth letters normalize to ASCII
        assert_eq!(Username::parse("ｓｈｏｐ").unwrap().as_str(), "shop");
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(Username::parse("ab").is_none());
        assert!(Username::parse(&"a".repeat(USERNAME_MAX_LENGTH + 1)).is_none());
        assert!(Username::parse("shop:1").is_none());
        assert!(Username::parse("shop one").is_none());
        assert!(Username::parse("___").is_none());
    }

    #[test]
    fn test_accepts_special_chars() {
        assert!(Username::parse("shop_01.north-side").is_some());
    }
}
