pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod state;
pub mod validate;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// The full HTTP surface: public, self-or-admin and admin-only routes.
///
/// Every request first passes through `identify`, which attaches the token
/// identity when one is presented. Each route group then applies its own
/// access check.
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(whoami_routes())
        .merge(protected_routes())
        .merge(elevated_routes())
        .fallback(not_found)
        // Global middleware
        .layer(from_fn_with_state(state.clone(), middleware::identify))
        .layer(from_fn(middleware::envelope_method_not_allowed))
        .layer(cors_layer(security))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/health", get(public::health))
        .route("/auth/token", post(public::auth_token))
        .route("/auth/register", post(public::auth_register))
}

fn whoami_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/auth/whoami", get(public::auth_whoami))
        .route_layer(from_fn(middleware::require_authenticated))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route(
            "/users/:username",
            get(protected::user_get)
                .patch(protected::user_patch)
                .delete(protected::user_delete),
        )
        .route("/users/:username/characters", post(protected::character_create))
        .route(
            "/users/:username/characters/:char_id",
            get(protected::character_get)
                .patch(protected::character_patch)
                .delete(protected::character_delete),
        )
        .route(
            "/users/:username/characters/:char_id/spell_cards/:idx",
            post(protected::spell_assign).delete(protected::spell_unassign),
        )
        .route_layer(from_fn(middleware::require_self_or_admin))
}

fn elevated_routes() -> Router<AppState> {
    use handlers::elevated;

    Router::new()
        .route("/users", get(elevated::users_list).post(elevated::users_create))
        .route("/characters", get(elevated::characters_list))
        .route(
            "/spell_cards",
            get(elevated::spell_cards_list).post(elevated::spell_cards_create),
        )
        .route_layer(from_fn(middleware::require_admin))
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::config::AppConfig;
    use crate::database::DatabaseManager;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // No test here reaches the database; the pool never connects.
    fn test_app() -> (Router, AppState) {
        let config = AppConfig::test();
        let pool = DatabaseManager::connect_lazy(&config.database).unwrap();
        let state = AppState::new(&config, pool).unwrap();
        (app(state.clone(), &config.security), state)
    }

    fn token_for(state: &AppState, username: &str, is_admin: bool) -> String {
        state
            .tokens
            .issue(&Identity {
                username: username.to_string(),
                is_admin,
            })
            .unwrap()
    }

    /// Well-formed token signed with a different secret
    fn foreign_token(username: &str) -> String {
        let mut config = AppConfig::test();
        config.security.jwt_secret = "some-other-secret".to_string();
        crate::auth::JwtTokens::new(&config.security)
            .unwrap()
            .issue(&Identity {
                username: username.to_string(),
                is_admin: true,
            })
            .unwrap()
    }

    fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn admin_routes_reject_anonymous_callers() {
        let (app, _) = test_app();
        let response = app.oneshot(request(Method::GET, "/users", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            json_body(response).await,
            json!({ "error": { "message": "Unauthorized", "status": 401 } })
        );
    }

    #[tokio::test]
    async fn admin_routes_reject_regular_users() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .oneshot(request(Method::GET, "/spell_cards", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn users_cannot_reach_other_users() {
        let (app, state) = test_app();
        let token = token_for(&state, "u2", false);
        let response = app
            .oneshot(request(Method::GET, "/users/u1", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_tokens_are_treated_as_anonymous() {
        let (app, _) = test_app();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/users/u1", Some("not-a-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let other = foreign_token("u1");
        let response = app
            .oneshot(request(Method::GET, "/users/u1", Some(&other), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_patch_is_rejected_for_the_owner() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .oneshot(request(Method::PATCH, "/users/u1", Some(&token), Some(json!({}))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["message"], json!("No data"));
    }

    #[tokio::test]
    async fn admins_pass_the_self_check() {
        let (app, state) = test_app();
        let token = token_for(&state, "admin", true);
        let response = app
            .oneshot(request(
                Method::PATCH,
                "/users/u1/characters/1",
                Some(&token),
                Some(json!({})),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_bodies_are_listed() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .oneshot(request(
                Method::PATCH,
                "/users/u1/characters/1",
                Some(&token),
                Some(json!({ "lvl": 0, "wisdom": 40 })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            json!(["lvl must be between 1 and 20", "wisdom must be between 1 and 30"])
        );
    }

    #[tokio::test]
    async fn non_numeric_character_ids_are_bad_requests() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .oneshot(request(Method::GET, "/users/u1/characters/abc", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["status"], json!(400));
    }

    #[tokio::test]
    async fn unknown_routes_use_the_error_envelope() {
        let (app, _) = test_app();
        let response = app.oneshot(request(Method::GET, "/nowhere", None, None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({ "error": { "message": "Not Found", "status": 404 } })
        );
    }

    #[tokio::test]
    async fn unsupported_methods_use_the_error_envelope() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .oneshot(request(Method::PUT, "/users/u1", Some(&token), Some(json!({}))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(response.headers().contains_key(axum::http::header::ALLOW));
        assert_eq!(
            json_body(response).await,
            json!({ "error": { "message": "Method Not Allowed", "status": 405 } })
        );
    }

    #[tokio::test]
    async fn whoami_echoes_the_token_identity() {
        let (app, state) = test_app();
        let token = token_for(&state, "u1", false);
        let response = app
            .clone()
            .oneshot(request(Method::GET, "/auth/whoami", Some(&token), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "user": { "username": "u1", "isAdmin": false } })
        );

        let response = app.oneshot(request(Method::GET, "/auth/whoami", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let (app, _) = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/auth/token")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
