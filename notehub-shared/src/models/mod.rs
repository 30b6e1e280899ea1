/// Database models for NoteHub
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts (username, hashed password, roles, active flag)
/// - `note`: Notes assigned to users; only their existence matters to this
///   crate, as a guard blocking user deletion
///
/// # Example
///
/// ```no_run
/// use notehub_shared::models::user::{CreateUser, User};
/// use notehub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "alice".to_string(),
///     password_hash: "$2b$10$...".to_string(),
///     roles: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod note;
pub mod user;
