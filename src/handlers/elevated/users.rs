use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::handlers::public::auth::issue;
use crate::services::NewUser;
use crate::state::AppState;
use crate::validate::Validate;

/// POST /users - register any user, admins included; returns `{user, token}`
pub async fn users_create(
    State(state): State<AppState>,
    JsonBody(new_user): JsonBody<NewUser>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let new_user = new_user.validated()?;
    let user = state.users().register(new_user).await?;
    let token = issue(&state, user.username.clone(), user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "user": user, "token": token }))))
}

/// GET /users
pub async fn users_list(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let users = state.users().find_all().await?;
    Ok(Json(json!({ "users": users })))
}
