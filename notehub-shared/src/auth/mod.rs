/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: bcrypt password hashing and verification
///
/// # Example
///
/// ```no_run
/// use notehub_shared::auth::password::{hash_password, verify_password};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password").await?;
/// assert!(verify_password("user_password", &hash).await?);
/// # Ok(())
/// # }
/// ```

pub mod password;
