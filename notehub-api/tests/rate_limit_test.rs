/// Integration tests for the login rate limiter
///
/// The limiter is a standalone layer, so these tests mount it in front of
/// a stub login route and drive it directly; no database is involved.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::post,
    Json, Router,
};
use notehub_api::error::MessageResponse;
use notehub_api::middleware::rate_limit::{
    login_rate_limit, LoginRateLimiter, RateLimitPolicy,
};
use notehub_shared::events::{EventLog, ERROR_LOG};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::Service as _;

async fn login_stub() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "logged in".to_string(),
    })
}

fn test_app(policy: RateLimitPolicy, events: Arc<EventLog>) -> Router {
    let limiter = Arc::new(LoginRateLimiter::new(policy, events));

    Router::new()
        .route("/auth/login", post(login_stub))
        .layer(axum::middleware::from_fn_with_state(
            limiter,
            login_rate_limit,
        ))
}

fn login_request(ip: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("x-forwarded-for", ip)
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap()
}

/// Waits for the detached log write to land
async fn wait_for_file(path: &Path) {
    for _ in 0..100 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("log file {} never appeared", path.display());
}

#[tokio::test]
async fn test_admits_up_to_limit_with_headers() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(
        RateLimitPolicy::default(),
        Arc::new(EventLog::new(dir.path())),
    );

    for i in 0..5u32 {
        let response = app.call(login_request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers.get("RateLimit-Limit").unwrap(), "5");
        assert_eq!(
            headers.get("RateLimit-Remaining").unwrap(),
            &(4 - i).to_string()
        );
        assert!(headers.get("RateLimit-Reset").is_some());

        // Legacy headers are suppressed
        assert!(headers.get("X-RateLimit-Limit").is_none());
        assert!(headers.get("X-RateLimit-Remaining").is_none());
    }
}

#[tokio::test]
async fn test_sixth_request_rejected_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(
        RateLimitPolicy::default(),
        Arc::new(EventLog::new(dir.path())),
    );

    for _ in 0..5 {
        let response = app.call(login_request("10.0.0.1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.call(login_request("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body["message"],
        "Too many login attempts, please try again after a while"
    );

    let log_path = dir.path().join(ERROR_LOG);
    wait_for_file(&log_path).await;

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("Too many requests"));
    assert!(contents.contains("Too many login attempts"));
    assert!(contents.contains("POST"));
    assert!(contents.contains("/auth/login"));
    assert!(contents.contains("http://localhost:3000"));
}

#[tokio::test]
async fn test_clients_are_limited_independently() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(
        RateLimitPolicy::default(),
        Arc::new(EventLog::new(dir.path())),
    );

    for _ in 0..6 {
        app.call(login_request("10.0.0.1")).await.unwrap();
    }

    // A different client still gets through
    let response = app.call(login_request("10.0.0.2")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("RateLimit-Remaining").unwrap(),
        "4"
    );
}

#[tokio::test]
async fn test_window_rollover_reopens_gate() {
    let dir = tempfile::tempdir().unwrap();
    let policy = RateLimitPolicy {
        window: Duration::from_millis(100),
        ..RateLimitPolicy::default()
    };
    let mut app = test_app(policy, Arc::new(EventLog::new(dir.path())));

    for _ in 0..5 {
        app.call(login_request("10.0.0.1")).await.unwrap();
    }

    let response = app.call(login_request("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    tokio::time::sleep(Duration::from_millis(150)).await;

    let response = app.call(login_request("10.0.0.1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_custom_policy_status_and_message() {
    let dir = tempfile::tempdir().unwrap();
    let policy = RateLimitPolicy {
        max_requests: 1,
        status: StatusCode::SERVICE_UNAVAILABLE,
        message: "slow down".to_string(),
        ..RateLimitPolicy::default()
    };
    let mut app = test_app(policy, Arc::new(EventLog::new(dir.path())));

    app.call(login_request("10.0.0.1")).await.unwrap();
    let response = app.call(login_request("10.0.0.1")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["message"], "slow down");
}
