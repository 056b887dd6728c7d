//! # Authentication Module
//!
//! API key guard for the back office.
//!
//! The key comes from `security.api_key` in the config file or from
//! `PPDB_API_KEY`. When set, every `/admin/*` request must carry it in the
//! Authorization header, either as `Bearer <key>` or bare. Public pages,
//! the registration wizard and the applicant dashboard stay open.

use super::types::refusal;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use ppdb_core::Notice;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// The configured key, shared with the middleware.
pub type ApiKey = Arc<str>;

/// Compare two keys in constant time.
///
/// Both sides are padded to the longer length so `ct_eq` always runs over
/// the same number of bytes.
#[must_use]
pub fn keys_match(provided: &str, expected: &str) -> bool {
    let len = provided.len().max(expected.len());
    let pad = |key: &str| {
        let mut bytes = key.as_bytes().to_vec();
        bytes.resize(len, 0);
        bytes
    };

    let same_bytes: bool = pad(provided).ct_eq(&pad(expected)).into();
    same_bytes && provided.len() == expected.len()
}

fn unauthorized(request: &Request<Body>, reason: &'static str) -> Response {
    tracing::warn!(
        event = "auth_failure",
        reason,
        path = %request.uri().path(),
        "Back office request refused"
    );
    refusal(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        Notice::destructive("Akses ditolak", "Silakan login sebagai admin"),
    )
}

/// Require the configured key on every request of the admin router.
pub async fn api_key_auth_middleware(
    State(expected): State<ApiKey>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

    match provided {
        Some(key) if keys_match(key, &expected) => next.run(request).await,
        Some(_) => unauthorized(&request, "invalid_api_key"),
        None => unauthorized(&request, "missing_authorization_header"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_keys() {
        assert!(keys_match("sekolah-2024", "sekolah-2024"));
    }

    #[test]
    fn prefix_of_key_is_rejected() {
        assert!(!keys_match("sekolah", "sekolah-2024"));
        assert!(!keys_match("sekolah-2024-extra", "sekolah-2024"));
        assert!(!keys_match("", "sekolah-2024"));
    }

    #[test]
    fn padding_does_not_fake_a_match() {
        assert!(!keys_match("abc\0", "abc"));
    }
}
