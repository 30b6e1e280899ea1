/// User model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT COLLATE case_insensitive NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     roles TEXT[] NOT NULL DEFAULT ARRAY['Employee'],
///     active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The `case_insensitive` collation is nondeterministic ICU at comparison
/// strength 2, so both equality lookups and the unique constraint treat
/// usernames case- and accent-insensitively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account row
///
/// Passwords are stored as bcrypt hashes, never in plaintext. The hash is
/// excluded from serialization so a `User` can never leak it through a
/// response body.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (store-assigned)
    pub id: Uuid,

    /// Username, unique case- and accent-insensitively
    pub username: String,

    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role tokens; the store default applies when none were assigned
    pub roles: Vec<String>,

    /// Whether the account is active
    pub active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// User projection without the password hash
///
/// This is what list responses carry: plain data, detached from the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Username (uniqueness enforced by the store)
    pub username: String,

    /// bcrypt password hash (NOT the plaintext password)
    pub password_hash: String,

    /// Explicit roles; None leaves the column to its store default
    pub roles: Option<Vec<String>>,
}

/// Input for updating an existing user
///
/// Username, roles and active are replaced wholesale. The password hash is
/// only overwritten when a new one is supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    pub password_hash: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// When `roles` is None the INSERT omits the column so the store
    /// default applies.
    ///
    /// # Errors
    ///
    /// Returns an error if the username collides with an existing one
    /// (unique constraint violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = match data.roles {
            Some(roles) => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, password_hash, roles)
                    VALUES ($1, $2, $3)
                    RETURNING id, username, password_hash, roles, active, created_at, updated_at
                    "#,
                )
                .bind(data.username)
                .bind(data.password_hash)
                .bind(roles)
                .fetch_one(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, User>(
                    r#"
                    INSERT INTO users (username, password_hash)
                    VALUES ($1, $2)
                    RETURNING id, username, password_hash, roles, active, created_at, updated_at
                    "#,
                )
                .bind(data.username)
                .bind(data.password_hash)
                .fetch_one(pool)
                .await?
            }
        };

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, roles, active, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username
    ///
    /// The lookup is case- and accent-insensitive via the column collation,
    /// so `find_by_username(pool, "ALICE")` matches a stored `alice`.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, roles, active, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Replaces username, roles and active; overwrites the password hash
    /// only when a new one is supplied
    ///
    /// # Returns
    ///
    /// The updated user, or None if no row has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the new username collides with another user's,
    /// or the database is unreachable.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2,
                roles = $3,
                active = $4,
                password_hash = COALESCE($5, password_hash),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, password_hash, roles, active, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.roles)
        .bind(data.active)
        .bind(data.password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if a row was deleted, false if no row had that id.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users without their password hashes
    ///
    /// Ordered by creation date so list output is stable.
    pub async fn list_public(pool: &PgPool) -> Result<Vec<PublicUser>, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, username, roles, active, created_at, updated_at
            FROM users
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serialization_excludes_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: "$2b$10$secret".to_string(),
            roles: vec!["Employee".to_string()],
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_create_user_roles_optional() {
        let create = CreateUser {
            username: "bob".to_string(),
            password_hash: "hash".to_string(),
            roles: None,
        };
        assert!(create.roles.is_none());
    }

    // Integration tests for database operations are in the notehub-api
    // tests/ directory.
}
