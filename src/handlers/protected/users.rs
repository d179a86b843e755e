use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams};
use crate::services::UserUpdate;
use crate::state::AppState;
use crate::validate::Validate;

/// GET /users/:username - `{username, email, isAdmin, characters}`
pub async fn user_get(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Value>, ApiError> {
    let user = state.users().get(&username).await?;
    Ok(Json(json!({ "user": user })))
}

/// PATCH /users/:username - partial update of `email` and/or `password`
pub async fn user_patch(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
    JsonBody(changes): JsonBody<UserUpdate>,
) -> Result<Json<Value>, ApiError> {
    let changes = changes.validated()?;
    let user = state.users().update(&username, changes).await?;
    Ok(Json(json!({ "user": user })))
}

/// DELETE /users/:username - removes the user and their characters
pub async fn user_delete(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
) -> Result<Json<Value>, ApiError> {
    state.users().delete(&username).await?;
    Ok(Json(json!({ "deleted": username })))
}
