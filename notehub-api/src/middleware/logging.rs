/// Request audit logging middleware
///
/// Appends one `{METHOD}\t{url}\t{origin}` line per request to the request
/// event log, fire-and-forget, then passes the request through untouched.
/// This is the flat audit trail; structured per-request diagnostics come
/// from the tower-http trace layer.

use crate::app::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use notehub_shared::events::REQUEST_LOG;

/// Axum middleware recording each request in the audit log
pub async fn request_log(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    state.events.append_detached(
        format!("{}\t{}\t{}", req.method(), req.uri(), origin),
        REQUEST_LOG,
    );

    next.run(req).await
}
