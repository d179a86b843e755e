use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Idempotent table definitions.
const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("No data")]
    EmptyUpdate,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlx(err) => err
                .as_database_error()
                .map(|e| e.is_unique_violation())
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlx(err) => err
                .as_database_error()
                .map(|e| e.is_foreign_key_violation())
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Builds and checks the shared connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    /// Connect eagerly, failing fast when the database is unreachable
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let pool = Self::pool_options(config).connect(&config.url).await?;
        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Pool that opens connections on first use
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options(config).connect_lazy(&config.url)?)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Create any missing tables
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        pool.execute(SCHEMA_SQL).await?;
        info!("Database schema is up to date");
        Ok(())
    }
}
