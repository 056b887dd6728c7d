//! # Middleware Module
//!
//! Global rate limiting for the PPDB HTTP API.
//!
//! `security.rate_limit` (or `PPDB_RATE_LIMIT`) sets the requests per second
//! shared by all clients; 0 removes the layer entirely.

use super::types::refusal;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use ppdb_core::Notice;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Fallback quota when asked for a zero rate.
const DEFAULT_RPS: NonZeroU32 = NonZeroU32::new(100).expect("100 is non-zero");

/// One bucket shared by every client of the portal.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second).unwrap_or(DEFAULT_RPS);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Answer 429 with the usual envelope once the bucket is empty.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_ok() {
        return next.run(request).await;
    }

    tracing::warn!(
        event = "rate_limited",
        method = %request.method(),
        path = %request.uri().path(),
        "Rate limit exceeded"
    );
    refusal(
        StatusCode::TOO_MANY_REQUESTS,
        "Too Many Requests",
        Notice::destructive(
            "Terlalu banyak permintaan",
            "Silakan tunggu sebentar lalu coba lagi",
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_rate_uses_default_quota() {
        let limiter = create_rate_limiter(0);
        for _ in 0..100 {
            assert!(limiter.check().is_ok());
        }
    }

    #[test]
    fn single_request_quota_refuses_second_call() {
        let limiter = create_rate_limiter(1);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
