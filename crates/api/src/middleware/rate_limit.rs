//! Rate limiting middleware.
//!
//! Per-client rate limiting keyed by authenticated user, falling back to the
//! peer address for unauthenticated requests.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use serde_json::json;
use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

use crate::app::AppState;
use crate::middleware::user_auth::UserAuth;

/// Type alias for the rate limiter used per client.
type ClientRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests, one limiter per client key.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<ClientRateLimiter>>>,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the specified limit per minute.
    pub fn new(rate_limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            rate_limit_per_minute,
        }
    }

    fn get_or_create_limiter(&self, key: &str) -> Arc<ClientRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(key) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap();

        // Another thread may have created it between the locks.
        if let Some(limiter) = limiters.get(key) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.rate_limit_per_minute).unwrap_or(NonZeroU32::new(100).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(key.to_string(), limiter.clone());
        limiter
    }

    /// Check if a request from the given client should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(key);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

/// Middleware that applies per-client rate limiting.
///
/// Runs after authentication so the user ID is available as the key; for
/// unauthenticated routes the peer address is used.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(ref rate_limiter) = state.rate_limiter else {
        return next.run(req).await;
    };

    let key = match req.extensions().get::<UserAuth>() {
        Some(auth) => format!("user:{}", auth.user_id),
        None => req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| format!("ip:{}", info.0.ip()))
            .unwrap_or_else(|| "anonymous".to_string()),
    };

    if let Err(retry_after) = rate_limiter.check(&key) {
        return rate_limited_response(state.config.security.rate_limit_per_minute, retry_after);
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Rate limit of {} requests/minute exceeded", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Ok(value) = retry_after.to_string().parse() {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_within_quota() {
        let state = RateLimiterState::new(5);
        for i in 0..5 {
            assert!(state.check("user:a").is_ok(), "request {} should pass", i);
        }
        assert!(state.check("user:a").is_err());
    }

    #[test]
    fn keys_are_independent() {
        let state = RateLimiterState::new(1);
        assert!(state.check("user:a").is_ok());
        assert!(state.check("user:b").is_ok());
        assert!(state.check("ip:10.0.0.1").is_ok());
        assert!(state.check("user:a").is_err());
    }

    #[test]
    fn retry_after_at_least_one_second() {
        let state = RateLimiterState::new(1);
        state.check("k").unwrap();
        let retry_after = state.check("k").unwrap_err();
        assert!(retry_after >= 1);
    }

    #[test]
    fn limiter_reused_per_key() {
        let state = RateLimiterState::new(100);
        let a = state.get_or_create_limiter("k");
        let b = state.get_or_create_limiter("k");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn rate_limited_response_shape() {
        let response = rate_limited_response(100, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "60");
    }
}
