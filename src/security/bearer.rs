use axum::http::{HeaderMap, header};

const BEARER_SCHEME: &str = "bearer";

/// extract_bearer_token
///
/// Pulls a bearer token out of the `Authorization` header(s).
///
/// Every header value is inspected in order; the first one whose scheme keyword is
/// `Bearer` (case-insensitive) wins. The token is the remainder of the value, trimmed
/// and cut at the first `,` (some clients append extra auth parameters).
///
/// A missing header, a different scheme, a non-ASCII value, or an empty token all
/// yield `None`. Malformed input is never an error.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::AUTHORIZATION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_bearer)
}

fn parse_bearer(value: &str) -> Option<String> {
    let value = value.trim_start();
    let scheme = value.get(..BEARER_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }

    let rest = &value[BEARER_SCHEME.len()..];
    // "Bearerabc" is a different scheme, not a bearer token.
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let token = rest.split(',').next().unwrap_or_default().trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
