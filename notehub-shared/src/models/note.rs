/// Note model
///
/// Notes belong to exactly one user. This crate does not manage their
/// lifecycle; it only needs to know whether any note references a user,
/// because such a user must not be deleted. The FK on `notes.user_id` is
/// `ON DELETE RESTRICT`, backing the same invariant inside the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Note row
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    pub title: String,

    pub body: String,

    pub completed: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a note
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNote {
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
}

impl Note {
    /// Creates a note assigned to a user
    pub async fn create(pool: &PgPool, data: CreateNote) -> Result<Self, sqlx::Error> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (user_id, title, body)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, title, body, completed, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.body)
        .fetch_one(pool)
        .await?;

        Ok(note)
    }

    /// Whether any note references the given user
    pub async fn any_for_user(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM notes WHERE user_id = $1)")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(exists)
    }
}
