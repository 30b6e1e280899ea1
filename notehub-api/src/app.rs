/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use notehub_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = notehub_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use crate::middleware::rate_limit::{LoginRateLimiter, RateLimitPolicy};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use notehub_shared::events::EventLog;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// File-backed event log (request audit + rate-limit rejections)
    pub events: Arc<EventLog>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let events = Arc::new(EventLog::new(config.log.dir.clone()));
        Self {
            db,
            config: Arc::new(config),
            events,
        }
    }

    /// Builds the login rate limiter from the configured policy
    ///
    /// The login route itself is mounted by the outer router that owns
    /// authentication; it layers this limiter in front of that route with
    /// `axum::middleware::from_fn_with_state(limiter, login_rate_limit)`.
    pub fn login_rate_limiter(&self) -> Arc<LoginRateLimiter> {
        let policy = RateLimitPolicy {
            window: Duration::from_secs(self.config.rate_limit.login_window_seconds),
            max_requests: self.config.rate_limit.login_max_requests,
            ..RateLimitPolicy::default()
        };

        Arc::new(LoginRateLimiter::new(policy, self.events.clone()))
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health            # Health check
/// └── /users             # User management
///     ├── GET            # List users
///     ├── POST           # Create user
///     ├── PATCH          # Update user
///     └── DELETE         # Delete user
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Tracing (tower-http TraceLayer)
/// 3. Request audit log (file-backed)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let user_routes = Router::new().route(
        "/users",
        get(routes::users::list_users)
            .post(routes::users::create_user)
            .patch(routes::users::update_user)
            .delete(routes::users::delete_user),
    );

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(user_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::logging::request_log,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
