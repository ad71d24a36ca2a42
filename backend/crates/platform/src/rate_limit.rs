//! Rate Limiting Infrastructure
//!
//! Sliding-window limiter over a timestamp log kept in a [`KvStore`], plus the
//! axum middleware that applies it per client and namespace.
//!
//! Each logical key owns a JSON array of millisecond timestamps stored under
//! `rate_limit:<key>`. A check prunes entries older than the window, rejects
//! without writing when the log is full, otherwise appends `now` and rewrites
//! the log with a TTL of the window rounded up to whole seconds.

use crate::client::client_key;
use crate::kv::{KvError, KvStore};
use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use kernel::error::app_error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Prefix of every window record in the store
pub const KEY_PREFIX: &str = "rate_limit:";

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Rate limit configuration for one namespace
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Key prefix separating counters (`<namespace>:<client>`)
    pub namespace: String,
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
    /// Body `error` text on rejection
    pub exceeded_message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::api()
    }
}

impl RateLimitConfig {
    pub fn new(
        namespace: impl Into<String>,
        max_requests: u32,
        window_ms: u64,
        exceeded_message: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            max_requests,
            window: Duration::from_millis(window_ms),
            exceeded_message: exceeded_message.into(),
        }
    }

    /// General API traffic: 100 requests per minute
    pub fn api() -> Self {
        Self::new("api", 100, 60_000, "Rate limit exceeded")
    }

    /// Authentication endpoints: 5 attempts per 15 minutes
    pub fn auth() -> Self {
        Self::new("auth", 5, 15 * 60_000, "Too many authentication attempts")
    }

    /// Payment endpoints: 10 requests per minute
    pub fn payments() -> Self {
        Self::new("payments", 10, 60_000, "Rate limit exceeded")
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }
}

/// Outcome of a single limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests left in the window after this one (admitted only)
    pub remaining: Option<u32>,
    /// Epoch ms when the window next admits a request (rejected only)
    pub reset_time_ms: Option<i64>,
}

impl RateLimitDecision {
    fn admitted(remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining: Some(remaining),
            reset_time_ms: None,
        }
    }

    fn rejected(reset_time_ms: i64) -> Self {
        Self {
            allowed: false,
            remaining: None,
            reset_time_ms: Some(reset_time_ms),
        }
    }
}

/// Sliding-window limiter backed by a shared key-value store
pub struct RateLimiter<S> {
    store: Arc<S>,
}

impl<S> Clone for RateLimiter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> RateLimiter<S>
where
    S: KvStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Check and record a request for `key` against the current clock
    pub async fn check_limit(
        &self,
        key: &str,
        limit: u32,
        window_ms: i64,
    ) -> Result<RateLimitDecision, KvError> {
        self.check_limit_at(key, limit, window_ms, Utc::now().timestamp_millis())
            .await
    }

    /// Check and record a request for `key` at `now_ms`
    pub async fn check_limit_at(
        &self,
        key: &str,
        limit: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> Result<RateLimitDecision, KvError> {
        let storage_key = format!("{KEY_PREFIX}{key}");
        let window_start = now_ms - window_ms;

        let mut requests = self.load(&storage_key).await?;
        requests.retain(|&ts| ts > window_start);

        if requests.len() >= limit as usize {
            let reset_time_ms = requests
                .iter()
                .min()
                .map_or(now_ms + window_ms, |oldest| oldest + window_ms);
            return Ok(RateLimitDecision::rejected(reset_time_ms));
        }

        requests.push(now_ms);
        let value = serde_json::to_string(&requests)
            .map_err(|e| KvError::Unavailable(format!("encode window: {e}")))?;
        self.store
            .put(&storage_key, &value, Some(window_ttl(window_ms)))
            .await?;

        Ok(RateLimitDecision::admitted(limit - requests.len() as u32))
    }

    async fn load(&self, storage_key: &str) -> Result<Vec<i64>, KvError> {
        let Some(raw) = self.store.get(storage_key).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<i64>>(&raw) {
            Ok(requests) => Ok(requests),
            Err(e) => {
                tracing::warn!(key = %storage_key, error = %e, "Discarding unreadable rate-limit window");
                Ok(Vec::new())
            }
        }
    }
}

fn window_ttl(window_ms: i64) -> Duration {
    let secs = (window_ms.max(1) + 999) / 1000;
    Duration::from_secs(secs as u64)
}

// ============================================================================
// Middleware
// ============================================================================

/// State for [`enforce_rate_limit`]
pub struct RateLimitState<S> {
    pub limiter: RateLimiter<S>,
    pub config: Arc<RateLimitConfig>,
}

impl<S> Clone for RateLimitState<S> {
    fn clone(&self) -> Self {
        Self {
            limiter: self.limiter.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> RateLimitState<S>
where
    S: KvStore + Send + Sync + 'static,
{
    pub fn new(store: Arc<S>, config: RateLimitConfig) -> Self {
        Self {
            limiter: RateLimiter::new(store),
            config: Arc::new(config),
        }
    }
}

/// Reject requests over the namespace quota with 429
///
/// Use with `axum::middleware::from_fn_with_state`.
pub async fn enforce_rate_limit<S>(
    State(state): State<RateLimitState<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: KvStore + Send + Sync + 'static,
{
    let config = &state.config;
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_key(req.headers(), direct_ip);
    let key = format!("{}:{}", config.namespace, client);

    let decision = match state
        .limiter
        .check_limit(&key, config.max_requests, config.window_ms())
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            tracing::error!(namespace = %config.namespace, error = %e, "Rate-limit store failure");
            return AppError::from(e).into_response();
        }
    };

    if !decision.allowed {
        tracing::warn!(namespace = %config.namespace, client = %client, "Rate limit exceeded");
        return AppError::too_many_requests(config.exceeded_message.clone())
            .with_detail("resetTime", decision.reset_time_ms.unwrap_or_default())
            .into_response();
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(config.max_requests));
    if let Some(remaining) = decision.remaining {
        headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    }
    response
}

#[cfg(test)]
mod tests {
    use super::{
        KEY_PREFIX, RateLimitConfig, RateLimitDecision, RateLimitState, RateLimiter,
        X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, enforce_rate_limit, window_ttl,
    };
    use crate::kv::{KvStore, MemoryKvStore};
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn limiter() -> (RateLimiter<MemoryKvStore>, MemoryKvStore) {
        let store = MemoryKvStore::new();
        (RateLimiter::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_boundary_rejects_fourth_call() {
        let (limiter, _) = limiter();
        let first = 1_000_000;

        for (i, now) in [first, first + 10, first + 20].into_iter().enumerate() {
            let decision = limiter.check_limit_at("auth:1.2.3.4", 3, 1000, now).await.unwrap();
            assert!(decision.allowed);
            assert_eq!(decision.remaining, Some(2 - i as u32));
        }

        let decision = limiter
            .check_limit_at("auth:1.2.3.4", 3, 1000, first + 30)
            .await
            .unwrap();
        assert_eq!(
            decision,
            RateLimitDecision {
                allowed: false,
                remaining: None,
                reset_time_ms: Some(first + 1000),
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_does_not_count() {
        let (limiter, store) = limiter();
        limiter.check_limit_at("k", 1, 1000, 100).await.unwrap();
        let before = store.get(&format!("{KEY_PREFIX}k")).await.unwrap();

        for now in [200, 300, 400] {
            assert!(!limiter.check_limit_at("k", 1, 1000, now).await.unwrap().allowed);
        }
        let after = store.get(&format!("{KEY_PREFIX}k")).await.unwrap();
        assert_eq!(before, after);
        assert_eq!(after.as_deref(), Some("[100]"));
    }

    #[tokio::test]
    async fn test_window_slides() {
        let (limiter, _) = limiter();
        for now in [0, 100, 200] {
            assert!(limiter.check_limit_at("k", 3, 1000, now).await.unwrap().allowed);
        }
        assert!(!limiter.check_limit_at("k", 3, 1000, 999).await.unwrap().allowed);

        // The entry at 0 falls out once now - window reaches it
        let decision = limiter.check_limit_at("k", 3, 1000, 1000).await.unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.remaining, Some(0));
    }

    #[tokio::test]
    async fn test_window_slides_in_real_time() {
        let (limiter, _) = limiter();
        assert!(limiter.check_limit("rt", 1, 50).await.unwrap().allowed);
        assert!(!limiter.check_limit("rt", 1, 50).await.unwrap().allowed);

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(limiter.check_limit("rt", 1, 50).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_namespaces_do_not_share_counters() {
        let (limiter, _) = limiter();
        assert!(limiter.check_limit_at("auth:ip", 1, 1000, 0).await.unwrap().allowed);
        assert!(limiter.check_limit_at("products:ip", 1, 1000, 0).await.unwrap().allowed);
        assert!(!limiter.check_limit_at("auth:ip", 1, 1000, 1).await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_zero_limit_rejects() {
        let (limiter, store) = limiter();
        let decision = limiter.check_limit_at("z", 0, 5000, 42).await.unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reset_time_ms, Some(5042));
        assert_eq!(store.get(&format!("{KEY_PREFIX}z")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_window_is_reset() {
        let (limiter, store) = limiter();
        store
            .put(&format!("{KEY_PREFIX}bad"), "not json", None)
            .await
            .unwrap();
        let decision = limiter.check_limit_at("bad", 2, 1000, 10).await.unwrap();
        assert_eq!(decision.remaining, Some(1));
    }

    #[test]
    fn test_window_ttl_rounds_up() {
        assert_eq!(window_ttl(1000), Duration::from_secs(1));
        assert_eq!(window_ttl(1001), Duration::from_secs(2));
        assert_eq!(window_ttl(250), Duration::from_secs(1));
        assert_eq!(window_ttl(900_000), Duration::from_secs(900));
    }

    #[test]
    fn test_presets() {
        let auth = RateLimitConfig::auth();
        assert_eq!(auth.max_requests, 5);
        assert_eq!(auth.window_ms(), 900_000);
        assert_eq!(auth.exceeded_message, "Too many authentication attempts");
        assert_eq!(RateLimitConfig::default().namespace, "api");
        assert_eq!(RateLimitConfig::payments().max_requests, 10);
    }

    fn app(max_requests: u32) -> Router {
        let config = RateLimitConfig::new("auth", max_requests, 60_000, "Too many authentication attempts");
        let state = RateLimitState::new(Arc::new(MemoryKvStore::new()), config);
        Router::new()
            .route("/", get(|| async { "ok" }))
            .layer(from_fn_with_state(state, enforce_rate_limit::<MemoryKvStore>))
    }

    fn request_from(ip: &str) -> Request<Body> {
        Request::builder()
            .uri("/")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_middleware_sets_headers_and_rejects() {
        let app = app(2);

        let response = app.clone().oneshot(request_from("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[X_RATELIMIT_LIMIT], "2");
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "1");

        let response = app.clone().oneshot(request_from("10.0.0.1")).await.unwrap();
        assert_eq!(response.headers()[X_RATELIMIT_REMAINING], "0");

        let response = app.clone().oneshot(request_from("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Too many authentication attempts");
        assert!(body["resetTime"].as_i64().unwrap() > 0);

        // A different client has its own window
        let response = app.oneshot(request_from("10.0.0.2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
