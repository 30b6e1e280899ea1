/// User management endpoints
///
/// All four operations mount on `/users` and carry their parameters in the
/// JSON body, including ids. Error responses are `{"message": ...}`;
/// success responses are the same shape except List, which returns the
/// user array directly.
///
/// # Endpoints
///
/// - `GET /users` - List all users (password hashes omitted)
/// - `POST /users` - Create a user
/// - `PATCH /users` - Update a user wholesale
/// - `DELETE /users` - Delete a user with no notes assigned
///
/// A malformed or incomplete body is answered exactly like an absent
/// field, so clients see one 400 message per operation regardless of how
/// the input was broken.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, MessageResponse},
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use notehub_shared::{
    auth::password,
    models::{
        note::Note,
        user::{CreateUser, PublicUser, UpdateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Create request body
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    /// Username (required, non-empty)
    pub username: String,

    /// Plaintext password (required, non-empty; hashed before storage)
    pub password: String,

    /// Optional roles; an empty array is treated as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

/// Update request body
///
/// Username, roles and active replace the stored values wholesale. The
/// password is optional; when present and non-empty it is re-hashed and
/// overwritten.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Delete request body
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteUserRequest {
    pub id: Option<Uuid>,
}

/// List all users
///
/// # Endpoint
///
/// ```text
/// GET /users
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: no users exist
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list_public(&state.db).await?;

    if users.is_empty() {
        return Err(ApiError::BadRequest("No users found".to_string()));
    }

    Ok(Json(users))
}

/// Create a user
///
/// Checks for a duplicate username first as a fast path; the store's
/// unique constraint is what actually decides a create/create race, and
/// its violation maps to the same 409.
///
/// # Endpoint
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "username": "Alice", "password": "pw123", "roles": ["Manager"] }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing or empty username/password
/// - `409 Conflict`: username already taken (case-insensitively)
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(req) = payload
        .map_err(|_| ApiError::BadRequest("All fields are required!".to_string()))?;

    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("All fields are required!".to_string()));
    }

    if User::find_by_username(&state.db, &req.username)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("Username already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password).await?;

    // An empty roles array falls back to the store default, same as omission
    let roles = req.roles.filter(|r| !r.is_empty());

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            password_hash,
            roles,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("New user {} created successfully", user.username),
        }),
    ))
}

/// Update a user
///
/// # Endpoint
///
/// ```text
/// PATCH /users
/// Content-Type: application/json
///
/// { "id": "...", "username": "Alice", "roles": ["Manager"], "active": true }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing/mistyped field, empty roles, unknown id
/// - `409 Conflict`: username held by a different user
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(req) = payload
        .map_err(|_| ApiError::BadRequest("All fields are required!".to_string()))?;

    if req.username.is_empty() || req.roles.is_empty() {
        return Err(ApiError::BadRequest("All fields are required!".to_string()));
    }

    if User::find_by_id(&state.db, req.id).await?.is_none() {
        return Err(ApiError::BadRequest("User not found".to_string()));
    }

    // The original user may keep its own name; only a different holder conflicts
    if let Some(duplicate) = User::find_by_username(&state.db, &req.username).await? {
        if duplicate.id != req.id {
            return Err(ApiError::Conflict("Username already exists".to_string()));
        }
    }

    let password_hash = match req.password.as_deref().filter(|p| !p.is_empty()) {
        Some(plaintext) => Some(password::hash_password(plaintext).await?),
        None => None,
    };

    let updated = User::update(
        &state.db,
        req.id,
        UpdateUser {
            username: req.username,
            roles: req.roles,
            active: req.active,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::BadRequest("User not found".to_string()))?;

    Ok(Json(MessageResponse {
        message: format!("User {} updated", updated.username),
    }))
}

/// Delete a user
///
/// Refused while any note references the user; the FK in the store backs
/// the same rule against races between the check and the delete.
///
/// # Endpoint
///
/// ```text
/// DELETE /users
/// Content-Type: application/json
///
/// { "id": "..." }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing id, notes still assigned, unknown id
pub async fn delete_user(
    State(state): State<AppState>,
    payload: Result<Json<DeleteUserRequest>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let id = payload
        .ok()
        .and_then(|Json(req)| req.id)
        .ok_or_else(|| ApiError::BadRequest("User ID is required!".to_string()))?;

    if Note::any_for_user(&state.db, id).await? {
        return Err(ApiError::BadRequest(
            "User has notes assigned to them!".to_string(),
        ));
    }

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::BadRequest("User not found!".to_string()))?;

    User::delete(&state.db, id).await?;

    Ok(Json(MessageResponse {
        message: format!("User: {} with ID: {} has been deleted", user.username, user.id),
    }))
}
