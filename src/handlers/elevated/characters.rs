use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// GET /characters - `{id, char_name, username}` for every character
pub async fn characters_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let characters = state.characters().find_all().await?;
    Ok(Json(json!({ "characters": characters })))
}
