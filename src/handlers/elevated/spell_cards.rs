use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::services::NewSpellCard;
use crate::state::AppState;
use crate::validate::Validate;

/// GET /spell_cards - the whole catalog, by idx
pub async fn spell_cards_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let spell_cards = state.spell_cards().find_all().await?;
    Ok(Json(json!({ "spell_cards": spell_cards })))
}

/// POST /spell_cards - add a catalog entry; the response names the key `index`
pub async fn spell_cards_create(
    State(state): State<AppState>,
    JsonBody(card): JsonBody<NewSpellCard>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let card = card.validated()?;
    let spell_card = state.spell_cards().create(card).await?;
    Ok((StatusCode::CREATED, Json(json!({ "spell_card": spell_card }))))
}
