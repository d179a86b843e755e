use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, info, warn};

use crate::auth::Passwords;
use crate::database::models::{CharacterSummary, PublicUser, UserDetail, UserRow};
use crate::database::{sql_for_partial_update, ColumnMap};
use crate::validate::{check_email, check_length, Validate};

use super::{into_fields, ServiceError};

/// Client field -> `users` column for partial updates
const USER_COLUMNS: ColumnMap = &[("email", "email"), ("password", "password")];

const PUBLIC_COLUMNS: &str = "username, email, is_admin";

/// Same message for unknown user and wrong password
const INVALID_CREDENTIALS: &str = "Invalid username/password";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

impl Validate for NewUser {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_length(&mut errors, "username", &self.username, 1, 25);
        check_length(&mut errors, "password", &self.password, 5, 20);
        check_email(&mut errors, "email", &self.email);
        errors
    }
}

/// Sparse user update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(email) = &self.email {
            check_email(&mut errors, "email", email);
        }
        if let Some(password) = &self.password {
            check_length(&mut errors, "password", password, 5, 20);
        }
        errors
    }
}

pub struct UserService {
    pool: PgPool,
    passwords: Passwords,
}

impl UserService {
    pub fn new(pool: PgPool, passwords: Passwords) -> Self {
        Self { pool, passwords }
    }

    /// Create a user, storing only a digest of the password
    pub async fn register(&self, new_user: NewUser) -> Result<PublicUser, ServiceError> {
        if self.exists(&new_user.username).await? {
            return Err(duplicate(&new_user.username));
        }

        let digest = self.passwords.hash(&new_user.password)?;

        let inserted = sqlx::query_as::<_, PublicUser>(&format!(
            "INSERT INTO users (username, email, password, is_admin) VALUES ($1, $2, $3, $4) RETURNING {}",
            PUBLIC_COLUMNS
        ))
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&digest)
        .bind(new_user.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(ServiceError::from);

        match inserted {
            Ok(user) => {
                info!("Registered user '{}' (admin: {})", user.username, user.is_admin);
                Ok(user)
            }
            // Lost a race with a concurrent registration of the same name
            Err(ServiceError::Database(e)) if e.is_unique_violation() => Err(duplicate(&new_user.username)),
            Err(e) => Err(e),
        }
    }

    /// Check credentials. Unknown users and wrong passwords fail identically,
    /// and both pay for one password verification.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<PublicUser, ServiceError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT username, email, password, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let verified = match &row {
            Some(user) => self.passwords.verify(password, &user.password),
            None => self.passwords.verify_missing(password),
        };

        match row {
            Some(user) if verified => Ok(user.into()),
            _ => {
                warn!("Failed authentication for '{}'", username);
                Err(ServiceError::Unauthorized(INVALID_CREDENTIALS.to_string()))
            }
        }
    }

    pub async fn find_all(&self) -> Result<Vec<PublicUser>, ServiceError> {
        let users = sqlx::query_as::<_, PublicUser>(&format!(
            "SELECT {} FROM users ORDER BY username",
            PUBLIC_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Public projection plus the user's characters
    pub async fn get(&self, username: &str) -> Result<UserDetail, ServiceError> {
        let user = sqlx::query_as::<_, PublicUser>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            PUBLIC_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| no_user(username))?;

        let characters = sqlx::query_as::<_, CharacterSummary>(
            r#"
            SELECT c.id, c.char_name, c.char_class, c.lvl
            FROM characters c
            JOIN user_characters uc ON uc.char_id = c.id
            WHERE uc.username = $1
            ORDER BY c.id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded user '{}' with {} characters", username, characters.len());
        Ok(UserDetail { user, characters })
    }

    /// Apply a partial update; a new password is hashed before it is stored
    pub async fn update(&self, username: &str, changes: UserUpdate) -> Result<PublicUser, ServiceError> {
        let mut fields = into_fields(&changes);
        if let Some(password) = changes.password.as_deref() {
            let digest = self.passwords.hash(password)?;
            fields.insert("password".to_string(), Value::String(digest));
        }

        let update = sql_for_partial_update(fields, USER_COLUMNS)?;
        let sql = update.to_sql("users", "username", PUBLIC_COLUMNS);

        let user = update
            .bind(sqlx::query_as::<_, PublicUser>(&sql))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_user(username))?;

        debug!("Updated user '{}'", username);
        Ok(user)
    }

    /// Delete a user together with the characters they own
    pub async fn delete(&self, username: &str) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        let removed: Option<String> =
            sqlx::query_scalar("SELECT username FROM users WHERE username = $1 FOR UPDATE")
                .bind(username)
                .fetch_optional(&mut *tx)
                .await?;
        if removed.is_none() {
            return Err(no_user(username));
        }

        sqlx::query(
            "DELETE FROM characters WHERE id IN (SELECT char_id FROM user_characters WHERE username = $1)",
        )
        .bind(username)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Deleted user '{}'", username);
        Ok(())
    }

    async fn exists(&self, username: &str) -> Result<bool, ServiceError> {
        let found: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

fn no_user(username: &str) -> ServiceError {
    ServiceError::NotFound(format!("No user: {}", username))
}

fn duplicate(username: &str) -> ServiceError {
    ServiceError::BadRequest(format!("Duplicate username: {}", username))
}
