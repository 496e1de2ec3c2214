//! Client request helpers
//!
//! Functions for reading caller-supplied headers: the bearer session token
//! and the public origin the request arrived on.

use axum::http::{HeaderMap, header};

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. Empty tokens count as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Derive the origin (`scheme://host[:port]`) the caller used.
///
/// Checks, in order: `Origin`, then `X-Forwarded-Proto` with
/// `X-Forwarded-Host` (reverse proxy setups), then `Host` over http.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = header_str(headers, header::ORIGIN.as_str()) {
        if origin != "null" {
            return Some(origin.trim_end_matches('/').to_string());
        }
    }

    let forwarded_host = header_str(headers, "x-forwarded-host")
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    let host = forwarded_host.or_else(|| header_str(headers, header::HOST.as_str()))?;
    if host.is_empty() {
        return None;
    }

    let scheme = header_str(headers, "x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("http");

    Some(format!("{scheme}://{host}"))
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("bearer  xyz "));
        assert_eq!(bearer_token(&headers), Some("xyz"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_request_origin_prefers_origin_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://app.example.org/"));
        headers.insert(header::HOST, HeaderValue::from_static("internal:8000"));
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("https://app.example.org")
        );
    }

    #[test]
    fn test_request_origin_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("scan.example.org, proxy"));
        headers.insert(header::HOST, HeaderValue::from_static("internal:8000"));
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("https://scan.example.org")
        );
    }

    #[test]
    fn test_request_origin_host_fallback() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_origin(&headers), None);

        headers.insert(header::HOST, HeaderValue::from_static("localhost:8000"));
        assert_eq!(
            request_origin(&headers).as_deref(),
            Some("http://localhost:8000")
        );
    }
}
