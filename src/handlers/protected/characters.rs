use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extract::{JsonBody, PathParams};
use crate::services::{CharacterUpdate, NewCharacter};
use crate::state::AppState;
use crate::validate::Validate;

// Character routes address characters by `:char_id` only. `:username` is
// consumed by the self-or-admin check and is not matched against the owner.

/// POST /users/:username/characters - create a character owned by `:username`
pub async fn character_create(
    State(state): State<AppState>,
    PathParams(username): PathParams<String>,
    JsonBody(new): JsonBody<NewCharacter>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new = new.validated()?;
    if let Some(body_username) = &new.username {
        if body_username != &username {
            return Err(ApiError::bad_request(format!(
                "username {} does not match route user {}",
                body_username, username
            )));
        }
    }

    let character = state.characters().create(&username, new).await?;
    Ok((StatusCode::CREATED, Json(json!({ "character": character }))))
}

/// GET /users/:username/characters/:char_id - full character plus `spells`
pub async fn character_get(
    State(state): State<AppState>,
    PathParams((_username, char_id)): PathParams<(String, i32)>,
) -> Result<Json<Value>, ApiError> {
    let character = state.characters().get(char_id).await?;
    Ok(Json(json!({ "character": character })))
}

/// PATCH /users/:username/characters/:char_id - echoes `{id, char_name, char_class, lvl}`
pub async fn character_patch(
    State(state): State<AppState>,
    PathParams((_username, char_id)): PathParams<(String, i32)>,
    JsonBody(changes): JsonBody<CharacterUpdate>,
) -> Result<Json<Value>, ApiError> {
    let changes = changes.validated()?;
    let character = state.characters().update(char_id, changes).await?;
    Ok(Json(json!({ "character": character })))
}

/// DELETE /users/:username/characters/:char_id
pub async fn character_delete(
    State(state): State<AppState>,
    PathParams((_username, char_id)): PathParams<(String, i32)>,
) -> Result<Json<Value>, ApiError> {
    state.characters().delete(char_id).await?;
    Ok(Json(json!({ "deleted": char_id })))
}

/// POST /users/:username/characters/:char_id/spell_cards/:idx
pub async fn spell_assign(
    State(state): State<AppState>,
    PathParams((_username, char_id, idx)): PathParams<(String, i32, String)>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let assignment = state.characters().assign_spell(char_id, &idx).await?;
    Ok((StatusCode::CREATED, Json(json!({ "assigned": assignment }))))
}

/// DELETE /users/:username/characters/:char_id/spell_cards/:idx
pub async fn spell_unassign(
    State(state): State<AppState>,
    PathParams((_username, char_id, idx)): PathParams<(String, i32, String)>,
) -> Result<Json<Value>, ApiError> {
    state.characters().unassign_spell(char_id, &idx).await?;
    Ok(Json(json!({ "unassigned": idx })))
}
