use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub hashing: HashingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    /// `None` issues tokens without an `exp` claim.
    pub token_expiry_hours: Option<u64>,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingConfig {
    /// Smallest cost argon2 accepts. Only for tests.
    pub const MINIMAL: HashingConfig = HashingConfig {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };

    pub const PRODUCTION: HashingConfig = HashingConfig {
        memory_kib: 19456,
        iterations: 2,
        parallelism: 1,
    };
}

const DEFAULT_SECRET: &str = "spellbook-development-secret";

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            Ok("test") => Environment::Test,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Test => Self::test(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("SPELLBOOK_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("SECRET_KEY") {
            if !v.is_empty() {
                self.security.jwt_secret = v;
            }
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_HOURS") {
            self.security.token_expiry_hours = v.parse().ok();
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Hashing overrides
        if let Ok(v) = env::var("HASH_MEMORY_KIB") {
            self.hashing.memory_kib = v.parse().unwrap_or(self.hashing.memory_kib);
        }
        if let Ok(v) = env::var("HASH_ITERATIONS") {
            self.hashing.iterations = v.parse().unwrap_or(self.hashing.iterations);
        }
        if let Ok(v) = env::var("HASH_PARALLELISM") {
            self.hashing.parallelism = v.parse().unwrap_or(self.hashing.parallelism);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/spellbook".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_SECRET.to_string(),
                token_expiry_hours: None,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            hashing: HashingConfig::PRODUCTION,
        }
    }

    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/spellbook_test".to_string(),
                max_connections: 5,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: "spellbook-test-secret".to_string(),
                token_expiry_hours: None,
                enable_cors: true,
                cors_origins: vec![],
            },
            hashing: HashingConfig::MINIMAL,
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/spellbook".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: DEFAULT_SECRET.to_string(),
                token_expiry_hours: Some(24),
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            hashing: HashingConfig::PRODUCTION,
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/spellbook".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_hours: Some(24 * 7),
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            hashing: HashingConfig::PRODUCTION,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
