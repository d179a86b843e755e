use axum::{extract::Extension, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::services::NewUser;
use crate::state::AppState;
use crate::validate::{check_email, check_length, Validate};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

impl Validate for TokenRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_length(&mut errors, "username", &self.username, 1, 25);
        check_length(&mut errors, "password", &self.password, 1, 20);
        errors
    }
}

/// Self-registration body; the admin flag cannot be chosen here
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_length(&mut errors, "username", &self.username, 1, 25);
        check_length(&mut errors, "password", &self.password, 5, 20);
        check_email(&mut errors, "email", &self.email);
        errors
    }
}

/// POST /auth/token - exchange credentials for a token
///
/// ```json
/// { "username": "u1", "password": "password1" }  ->  { "token": "eyJ..." }
/// ```
pub async fn auth_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<TokenRequest>,
) -> Result<Json<Value>, ApiError> {
    let body = body.validated()?;
    let user = state.users().authenticate(&body.username, &body.password).await?;
    let token = issue(&state, user.username, user.is_admin)?;
    Ok(Json(json!({ "token": token })))
}

/// POST /auth/register - create a regular (non-admin) account and log it in
pub async fn auth_register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = body.validated()?;
    let user = state
        .users()
        .register(NewUser {
            username: body.username,
            email: body.email,
            password: body.password,
            is_admin: false,
        })
        .await?;
    let token = issue(&state, user.username, user.is_admin)?;
    Ok((StatusCode::CREATED, Json(json!({ "token": token }))))
}

/// GET /auth/whoami - the identity the presented token resolves to
pub async fn auth_whoami(Extension(identity): Extension<Identity>) -> Json<Value> {
    Json(json!({ "user": identity }))
}

pub(crate) fn issue(state: &AppState, username: String, is_admin: bool) -> Result<String, ApiError> {
    state
        .tokens
        .issue(&Identity { username, is_admin })
        .map_err(|e| {
            tracing::error!("Token generation failed: {}", e);
            ApiError::internal_server_error("Failed to issue token")
        })
}
