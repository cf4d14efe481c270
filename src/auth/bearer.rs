//! Bearer credential extraction.
//!
//! Sources, first present wins:
//! 1. a [`RawAuthorization`] request extension set by an upstream layer,
//! 2. the `Authorization` header (`HeaderMap` lookups are case-insensitive).
//!
//! Only `Bearer <token>` values yield a credential; anything else counts as
//! no credential at all.

use axum::http::{header::AUTHORIZATION, Extensions, HeaderMap};

/// Authorization value resolved before the request reached the router
/// (e.g. by a proxy adapter that exposes it outside the header map).
#[derive(Debug, Clone)]
pub struct RawAuthorization(pub String);

/// Locate the bearer token for a request.
pub fn extract_bearer(extensions: &Extensions, headers: &HeaderMap) -> Option<String> {
    let value = match extensions.get::<RawAuthorization>() {
        Some(raw) => raw.0.clone(),
        None => headers.get(AUTHORIZATION)?.to_str().ok()?.to_string(),
    };

    parse_bearer(&value).map(str::to_string)
}

/// Parse `Bearer <token>`. The scheme is case-sensitive and must be followed
/// by whitespace; the token is the first whitespace-free run after it.
pub fn parse_bearer(value: &str) -> Option<&str> {
    let rest = value.trim().strip_prefix("Bearer")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    rest.split_whitespace().next()
}
