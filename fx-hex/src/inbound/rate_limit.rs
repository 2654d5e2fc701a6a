//! Rate limiting middleware using Governor.
//!
//! Implements per-client rate limiting with a token bucket algorithm. A client
//! is its live session when the cookie names one the store knows, else its
//! peer address. Unknown cookie values never get a bucket of their own.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use dashmap::DashMap;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde_json::json;
use std::{net::SocketAddr, num::NonZeroU32, sync::Arc, time::Duration};

use fx_types::{RateProvider, SessionStore};

use super::handlers::AppState;
use super::session;

/// Default per-client quota per minute.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 100;

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    /// Per-client rate limiters
    limiters: DashMap<String, Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>>,
    /// Quota for new clients
    quota: Quota,
}

impl Default for RateLimiterState {
    fn default() -> Self {
        Self::new(DEFAULT_REQUESTS_PER_MINUTE, Duration::from_secs(60))
    }
}

impl RateLimiterState {
    /// Creates a new rate limiter state.
    ///
    /// # Arguments
    /// * `requests` - Number of requests allowed per period (0 is treated as 1)
    /// * `period` - Time period for the quota
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            limiters: DashMap::new(),
            quota,
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, key: &str) -> bool {
        let limiter = self
            .limiters
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone();

        limiter.check().is_ok()
    }
}

/// Middleware state: the shared limiter plus the app state for session lookups.
pub type RateLimitState<P, S> = (Arc<RateLimiterState>, Arc<AppState<P, S>>);

fn client_key<'a, S: SessionStore>(
    sessions: &'a S,
    request: &'a Request<Body>,
) -> impl Future<Output = String> + Send + 'a {
    // `Body` is not `Sync`, so borrow only the `Sync` parts across the await.
    let headers = request.headers();
    let extensions = request.extensions();
    async move {
        let jar = CookieJar::from_headers(headers);
        match session::load_existing(sessions, &jar).await {
            Ok(Some(current)) => return format!("session:{}", current.id),
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "session lookup failed, keying by address"),
        }
        extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| format!("ip:{}", addr.ip()))
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Rate limiting middleware for the conversion routes.
pub async fn rate_limit_middleware<P: RateProvider, S: SessionStore>(
    State((limiter, state)): State<RateLimitState<P, S>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&state.sessions, &request).await;

    if !limiter.check(&key) {
        tracing::warn!(client = %key, "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Rate limit exceeded. Please try again later.",
                "code": 429,
                "retry_after_seconds": 60
            })),
        )
            .into_response();
    }

    next.run(request).await
}
