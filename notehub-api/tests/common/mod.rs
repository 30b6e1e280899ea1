/// Common test utilities for integration tests
///
/// These tests need a running PostgreSQL reachable through `DATABASE_URL`;
/// the context runs the migrations itself and truncates the tables, so
/// every test starts from an empty store. Tests share one database, so
/// run them with `cargo test -- --test-threads=1`.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use notehub_api::app::{build_router, AppState};
use notehub_api::config::{ApiConfig, Config, DatabaseConfig, LogConfig, RateLimitConfig};
use sqlx::PgPool;
use tempfile::TempDir;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,

    // Keeps the event log directory alive for the context's lifetime
    _log_dir: TempDir,
}

impl TestContext {
    /// Creates a new test context on a clean database
    pub async fn new() -> anyhow::Result<Self> {
        let log_dir = TempDir::new()?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set for integration tests"))?,
                max_connections: 5,
            },
            rate_limit: RateLimitConfig {
                login_window_seconds: 60,
                login_max_requests: 5,
            },
            log: LogConfig {
                dir: log_dir.path().display().to_string(),
            },
        };

        let db = PgPool::connect(&config.database.url).await?;
        notehub_shared::db::migrations::run_migrations(&db).await?;

        // Every test asserts against global list/count state
        sqlx::query("TRUNCATE notes, users").execute(&db).await?;

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            _log_dir: log_dir,
        })
    }
}

/// Builds a JSON request against the user endpoints
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Creates a user through the API and returns its id from the store
pub async fn create_user(ctx: &TestContext, username: &str, password: &str) -> anyhow::Result<Uuid> {
    use tower::Service as _;

    let request = json_request(
        "POST",
        "/users",
        serde_json::json!({ "username": username, "password": password }),
    );

    let response = ctx.app.clone().call(request).await?;
    anyhow::ensure!(
        response.status() == StatusCode::CREATED,
        "user creation failed: {}",
        response.status()
    );

    let user = notehub_shared::models::user::User::find_by_username(&ctx.db, username)
        .await?
        .ok_or_else(|| anyhow::anyhow!("created user not found"))?;

    Ok(user.id)
}
