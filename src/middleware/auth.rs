use std::collections::HashMap;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{policy, Identity};
use crate::error::ApiError;
use crate::extract::PathParams;
use crate::state::AppState;

/// Attach the caller's identity when a valid bearer token is presented.
///
/// Never rejects: a missing, malformed or invalid token leaves the request
/// anonymous and the per-route checks decide.
pub async fn identify(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let identity = bearer_token(request.headers()).and_then(|token| state.verifier().decode(token).ok());

    if let Some(identity) = identity {
        tracing::debug!("Request identified as '{}' (admin: {})", identity.username, identity.is_admin);
        request.extensions_mut().insert(identity);
    }

    next.run(request).await
}

/// Token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

pub async fn require_authenticated(request: Request, next: Next) -> Result<Response, ApiError> {
    policy::require_authenticated(request.extensions().get::<Identity>())?;
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    policy::require_admin(request.extensions().get::<Identity>())?;
    Ok(next.run(request).await)
}

/// Compares the route's `:username` against the token identity
pub async fn require_self_or_admin(
    PathParams(params): PathParams<HashMap<String, String>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let route_username = params.get("username").map(String::as_str).unwrap_or_default();
    policy::require_self_or_admin(request.extensions().get::<Identity>(), route_username)?;
    Ok(next.run(request).await)
}
