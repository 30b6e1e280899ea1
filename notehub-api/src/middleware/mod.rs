/// Middleware modules for the API server
///
/// - `rate_limit`: fixed-window login rate limiter
/// - `logging`: file-backed request audit log

pub mod logging;
pub mod rate_limit;
