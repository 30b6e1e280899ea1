/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `users`: User management endpoints (list, create, update, delete)

pub mod health;
pub mod users;
