use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::character::CharacterSummary;

/// Full `users` row, including the password digest. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// The part of a user that is safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub username: String,
    pub email: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

impl From<UserRow> for PublicUser {
    fn from(row: UserRow) -> Self {
        Self {
            username: row.username,
            email: row.email,
            is_admin: row.is_admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: PublicUser,
    pub characters: Vec<CharacterSummary>,
}
