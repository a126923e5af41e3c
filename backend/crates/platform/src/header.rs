//! `Authorization` header parsing

use http::{HeaderMap, header::AUTHORIZATION};

/// Schemes accepted in front of a bearer token
///
/// Conduit clients send `Token <t>`; `Bearer` is accepted as well.
const SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// Extract the token from an `Authorization: Token <t>` header
///
/// Returns `None` when the header is absent, not valid UTF-8, uses another
/// scheme, or carries an empty token.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;

    if !SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }

    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}
