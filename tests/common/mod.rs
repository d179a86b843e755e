#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};

use spellbook_api::config::AppConfig;
use spellbook_api::database::DatabaseManager;
use spellbook_api::services::NewUser;
use spellbook_api::state::AppState;

pub const PASSWORD: &str = "password1";

pub struct TestServer {
    pub base_url: String,
    pub state: AppState,
    client: reqwest::Client,
}

/// Start the app on a free port against `TEST_DATABASE_URL`.
///
/// Returns `None` when no test database is configured so the suite can run
/// without Postgres.
pub async fn spawn_server() -> Result<Option<TestServer>> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping");
        return Ok(None);
    };

    let mut config = AppConfig::test();
    config.database.url = url;

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::ensure_schema(&pool).await?;
    let state = AppState::new(&config, pool)?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = spellbook_api::app(state.clone(), &config.security);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
        client: reqwest::Client::new(),
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Name that will not collide with other tests or earlier runs
pub fn unique(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", prefix, &id[..12])
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and return `(status, json body)`
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = self.request(method, path, token);
        if let Some(body) = body {
            builder = builder.json(&body);
        }
        let res = builder.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await.unwrap_or(Value::Null);
        Ok((status, body))
    }

    /// Register a regular user through the public route and return its token
    pub async fn register(&self, username: &str) -> Result<String> {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@user.com", username),
                    "password": PASSWORD,
                })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "register failed: {} {}", status, body);
        token_of(&body)
    }

    /// Create an admin directly through the service layer and log it in
    pub async fn admin(&self) -> Result<(String, String)> {
        let username = unique("admin");
        self.state
            .users()
            .register(NewUser {
                username: username.clone(),
                email: format!("{}@user.com", username),
                password: PASSWORD.to_string(),
                is_admin: true,
            })
            .await?;
        let token = self.login(&username, PASSWORD).await?;
        Ok((username, token))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/token",
                None,
                Some(json!({ "username": username, "password": password })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);
        token_of(&body)
    }

    /// Create a character for `username` and return its id
    pub async fn character(&self, username: &str, token: &str, name: &str) -> Result<i64> {
        let (status, body) = self
            .call(
                Method::POST,
                &format!("/users/{}/characters", username),
                Some(token),
                Some(json!({ "char_name": name, "char_class": "cleric", "lvl": 1 })),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "create character failed: {} {}", status, body);
        body["character"]["id"].as_i64().context("character id missing")
    }
}

fn token_of(body: &Value) -> Result<String> {
    body["token"]
        .as_str()
        .map(str::to_string)
        .context("response carried no token")
}
