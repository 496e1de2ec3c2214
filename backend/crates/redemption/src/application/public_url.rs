//! Public URL Resolver
//!
//! Picks the base URL printed into redeem links. Consulted only at issuance.

/// The configured override (trimmed, without trailing slash) if it is set and
/// non-empty, otherwise the request origin.
pub fn resolve(explicit_override: Option<&str>, request_origin: Option<&str>) -> Option<String> {
    explicit_override
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(request_origin.map(str::trim))
        .map(|base| base.trim_end_matches('/').to_string())
}

/// `{base}{redeem_path}?token={token}`; relative when there is no base.
///
/// Tokens are base64url plus `.`, so they need no escaping.
pub fn redeem_link(base: Option<&str>, redeem_path: &str, token: &str) -> String {
    let base = base.unwrap_or_default();
    if redeem_path.starts_with('/') {
        format!("{base}{redeem_path}?token={token}")
    } else {
        format!("{base}/{redeem_path}?token={token}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        assert_eq!(
            resolve(Some(" https://redeem.example.org/ "), Some("http://10.0.0.2:8000")),
            Some("https://redeem.example.org".to_string())
        );
    }

    #[test]
    fn test_blank_override_falls_back_to_origin() {
        assert_eq!(
            resolve(Some("   "), Some("http://localhost:5173")),
            Some("http://localhost:5173".to_string())
        );
        assert_eq!(
            resolve(None, Some("http://localhost:5173/")),
            Some("http://localhost:5173".to_string())
        );
        assert_eq!(resolve(None, None), None);
    }

    #[test]
    fn test_redeem_link() {
        assert_eq!(
            redeem_link(Some("https://x.org"), "/scan", "v1.a.b"),
            "https://x.org/scan?token=v1.a.b"
        );
        assert_eq!(redeem_link(Some("https://x.org"), "scan", "t"), "https://x.org/scan?token=t");
        assert_eq!(redeem_link(None, "/scan", "t"), "/scan?token=t");
    }
}
