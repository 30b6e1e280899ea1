/// Login rate limiting middleware
///
/// A fixed-window request gate keyed by client IP, meant to be layered in
/// front of a login route. The window state lives behind the
/// [`RateLimitStore`] trait so the in-memory default can be swapped for a
/// distributed store when several instances share one limit.
///
/// # Policy
///
/// - Window: 60 seconds
/// - Admitted: 5 requests per window per client
/// - Rejection: 429 with a JSON `{"message": ...}` body
///
/// Each client key is either Open (count below the limit, requests pass)
/// or Closed (limit reached, requests rejected) until the window boundary
/// passes; there is no memory across windows.
///
/// # Headers
///
/// Admitted responses carry the standardized rate-limit header set:
/// - `RateLimit-Limit`: requests allowed per window
/// - `RateLimit-Remaining`: requests left in the current window
/// - `RateLimit-Reset`: seconds until the window rolls over
///
/// The legacy `X-RateLimit-*` set is deliberately not emitted.
///
/// # Example
///
/// ```no_run
/// use notehub_api::middleware::rate_limit::{login_rate_limit, LoginRateLimiter, RateLimitPolicy};
/// use notehub_shared::events::EventLog;
/// use axum::Router;
/// use std::sync::Arc;
///
/// # async fn login() {}
/// let events = Arc::new(EventLog::new("logs"));
/// let limiter = Arc::new(LoginRateLimiter::new(RateLimitPolicy::default(), events));
///
/// let app: Router = Router::new()
///     .route("/auth/login", axum::routing::post(login))
///     .layer(axum::middleware::from_fn_with_state(limiter, login_rate_limit));
/// ```

use crate::error::MessageResponse;
use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use notehub_shared::events::{EventLog, ERROR_LOG};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rate limit policy parameters
///
/// All four knobs are configuration; none is hard-coded in the control
/// flow.
#[derive(Debug, Clone)]
pub struct RateLimitPolicy {
    /// Fixed window length
    pub window: Duration,

    /// Requests admitted per window per client key
    pub max_requests: u32,

    /// Status code for rejected requests
    pub status: StatusCode,

    /// Message body for rejected requests
    pub message: String,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 5,
            status: StatusCode::TOO_MANY_REQUESTS,
            message: "Too many login attempts, please try again after a while".to_string(),
        }
    }
}

/// Usage of the current window after recording a request
#[derive(Debug, Clone, Copy)]
pub struct WindowUsage {
    /// Requests recorded in the window so far, including this one
    pub count: u32,

    /// Time until the window rolls over
    pub resets_in: Duration,
}

/// Per-key window counter storage
///
/// Implementations own the counters and their rollover; the middleware
/// only supplies the key and the window length. Swap in a shared-store
/// implementation when running more than one instance behind one limit.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` and returns the window usage
    async fn hit(&self, key: &str, window: Duration) -> WindowUsage;
}

#[derive(Debug)]
struct Window {
    started: Instant,
    count: u32,
}

/// In-memory fixed-window store
///
/// Keeps one window per client key in a sharded concurrent map. Counters
/// reset lazily: the first hit after the boundary starts a fresh window.
#[derive(Debug, Default)]
pub struct MemoryStore {
    windows: DashMap<String, Window>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(&self, key: &str, window: Duration) -> WindowUsage {
        let now = Instant::now();

        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(entry.started) >= window {
            entry.started = now;
            entry.count = 0;
        }

        entry.count += 1;

        WindowUsage {
            count: entry.count,
            resets_in: window.saturating_sub(now.duration_since(entry.started)),
        }
    }
}

/// Login rate limiter: policy + store + rejection logging
pub struct LoginRateLimiter {
    policy: RateLimitPolicy,
    store: Arc<dyn RateLimitStore>,
    events: Arc<EventLog>,
}

impl LoginRateLimiter {
    /// Creates a limiter backed by the in-memory store
    pub fn new(policy: RateLimitPolicy, events: Arc<EventLog>) -> Self {
        Self::with_store(policy, Arc::new(MemoryStore::new()), events)
    }

    /// Creates a limiter backed by a caller-supplied store
    pub fn with_store(
        policy: RateLimitPolicy,
        store: Arc<dyn RateLimitStore>,
        events: Arc<EventLog>,
    ) -> Self {
        Self {
            policy,
            store,
            events,
        }
    }

    /// The policy this limiter enforces
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }
}

/// Axum middleware enforcing the login rate limit
///
/// Layer with `axum::middleware::from_fn_with_state(limiter, login_rate_limit)`
/// in front of the login route. Rejections append a line with the message,
/// method, URL and declared origin to the error event log before the
/// response is written.
pub async fn login_rate_limit(
    State(limiter): State<Arc<LoginRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    let usage = limiter.store.hit(&key, limiter.policy.window).await;

    if usage.count > limiter.policy.max_requests {
        let origin = req
            .headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        limiter.events.append_detached(
            format!(
                "Too many requests: {}\t{}\t{}\t{}",
                limiter.policy.message,
                req.method(),
                req.uri(),
                origin
            ),
            ERROR_LOG,
        );

        tracing::warn!(
            client = %key,
            method = %req.method(),
            uri = %req.uri(),
            "Login rate limit exceeded"
        );

        return (
            limiter.policy.status,
            Json(MessageResponse {
                message: limiter.policy.message.clone(),
            }),
        )
            .into_response();
    }

    let remaining = limiter.policy.max_requests - usage.count;
    let reset_secs = usage.resets_in.as_secs();

    let mut response = next.run(req).await;

    let headers = response.headers_mut();
    headers.insert(
        "RateLimit-Limit",
        HeaderValue::from_str(&limiter.policy.max_requests.to_string()).unwrap(),
    );
    headers.insert(
        "RateLimit-Remaining",
        HeaderValue::from_str(&remaining.to_string()).unwrap(),
    );
    headers.insert(
        "RateLimit-Reset",
        HeaderValue::from_str(&reset_secs.to_string()).unwrap(),
    );

    response
}

/// Resolves the client key for a request
///
/// Prefers the first `X-Forwarded-For` entry (the proxy-facing deployments
/// this serves put the client there), then the peer socket address.
fn client_key(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
