//! Fixed-window request throttling.
//!
//! A single atomic counter tied to the index of the current time window;
//! when the clock moves into a new window the count starts over. Requests
//! past the per-window maximum get a 429 JSON response.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Extension, Request};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Counter-window limiter shared across all throttled routes.
#[derive(Clone)]
pub struct RateLimiter {
    /// Requests admitted per window.
    max_requests: u64,
    /// Window length in seconds, at least 1.
    window_secs: u64,
    /// Requests seen in the window that `window` points at.
    count: Arc<AtomicU64>,
    /// Index of the window the count belongs to (epoch secs / window_secs).
    window: Arc<AtomicU64>,
}

impl RateLimiter {
    /// Limiter admitting `max_requests` per `window_secs`-second window.
    pub fn new(max_requests: u64, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs: window_secs.max(1),
            count: Arc::new(AtomicU64::new(0)),
            window: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Whether this request fits in the current window.
    fn try_acquire(&self) -> bool {
        let window_index = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
            / self.window_secs;

        if window_index != self.window.load(Ordering::Relaxed) {
            // Rolled into a fresh window; this request is its first.
            self.window.store(window_index, Ordering::Relaxed);
            self.count.store(1, Ordering::Relaxed);
            return true;
        }

        self.count.fetch_add(1, Ordering::Relaxed) < self.max_requests
    }
}

/// Rejects requests over the limit with a 429 body, passes the rest through.
pub async fn rate_limit_middleware(
    Extension(limiter): Extension<RateLimiter>,
    req: Request,
    next: Next,
) -> Response {
    if !limiter.try_acquire() {
        let body = Json(serde_json::json!({
            "error": "too_many_requests",
            "message": "Rate limit exceeded"
        }));
        return (StatusCode::TOO_MANY_REQUESTS, body).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denies_after_limit_within_window() {
        // A one-hour window will not roll over mid-test.
        let limiter = RateLimiter::new(3, 3600);
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[test]
    fn test_zero_window_clamped() {
        let limiter = RateLimiter::new(1, 0);
        assert!(limiter.try_acquire());
    }
}
