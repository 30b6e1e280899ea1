/// Password hashing module using bcrypt
///
/// Passwords are hashed with bcrypt at cost factor 10 before they are
/// stored; plaintext never reaches the database. The hash output is a
/// self-describing string carrying the algorithm version, cost and salt:
///
/// ```text
/// $2b$10$N9qo8uLOickgx2ZMRZoMye...
/// ```
///
/// Hashing at this cost takes tens of milliseconds of pure CPU, so both
/// operations run on the blocking thread pool and the async caller awaits
/// them without stalling the runtime.

use bcrypt::BcryptError;

/// bcrypt cost factor applied to every hash
pub const HASH_COST: u32 = 10;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    Hash(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    Verify(String),
}

impl From<BcryptError> for PasswordError {
    fn from(err: BcryptError) -> Self {
        PasswordError::Hash(err.to_string())
    }
}

/// Hashes a password with bcrypt at [`HASH_COST`]
///
/// A fresh random salt is generated per call, so hashing the same password
/// twice yields different strings.
///
/// # Errors
///
/// Returns `PasswordError::Hash` if hashing fails or the blocking task is
/// cancelled.
pub async fn hash_password(password: &str) -> Result<String, PasswordError> {
    let password = password.to_owned();

    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, HASH_COST))
        .await
        .map_err(|e| PasswordError::Hash(format!("hashing task failed: {}", e)))??;

    Ok(hash)
}

/// Verifies a password against a stored bcrypt hash
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it does not.
///
/// # Errors
///
/// Returns `PasswordError::Verify` if the hash string is malformed or the
/// blocking task is cancelled.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let password = password.to_owned();
    let hash = hash.to_owned();

    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| PasswordError::Verify(format!("verification task failed: {}", e)))?
        .map_err(|e| PasswordError::Verify(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_password_format() {
        let hash = hash_password("test_password_123").await.unwrap();

        // bcrypt PHC prefix and the configured cost
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$10$"));
    }

    #[tokio::test]
    async fn test_hash_password_produces_different_salts() {
        let hash1 = hash_password("same_password").await.unwrap();
        let hash2 = hash_password("same_password").await.unwrap();

        assert_ne!(hash1, hash2);
    }

    #[tokio::test]
    async fn test_verify_password_correct() {
        let hash = hash_password("correct_password").await.unwrap();

        assert!(verify_password("correct_password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_password_incorrect() {
        let hash = hash_password("correct_password").await.unwrap();

        assert!(!verify_password("wrong_password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "not_a_bcrypt_hash").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_hash_verify_roundtrip() {
        let passwords = vec![
            "simple",
            "with spaces",
            "with-special-chars!@#$%",
            "unicode-密码-パスワード",
        ];

        for password in passwords {
            let hash = hash_password(password).await.unwrap();
            assert!(
                verify_password(password, &hash).await.unwrap(),
                "Password '{}' should verify",
                password
            );
        }
    }
}
