use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::models::character::DEFAULT_ABILITY_SCORE;
use crate::database::models::{
    Character, CharacterDetail, CharacterSummary, CharacterWithOwner, OwnedCharacter, SpellAssignment,
};
use crate::database::{sql_for_partial_update, ColumnMap};
use crate::validate::{check_length, check_range, Validate};

use super::{into_fields, ServiceError};

/// Client field -> `characters` column for partial updates
const CHARACTER_COLUMNS: ColumnMap = &[
    ("char_name", "char_name"),
    ("char_class", "char_class"),
    ("lvl", "lvl"),
    ("strength", "strength"),
    ("dexterity", "dexterity"),
    ("constitution", "constitution"),
    ("intelligence", "intelligence"),
    ("wisdom", "wisdom"),
    ("charisma", "charisma"),
];

const CHARACTER_FIELDS: &str =
    "id, char_name, char_class, lvl, strength, dexterity, constitution, intelligence, wisdom, charisma";

const SUMMARY_FIELDS: &str = "id, char_name, char_class, lvl";

const MAX_LEVEL: i32 = 20;
const MIN_SCORE: i32 = 1;
const MAX_SCORE: i32 = 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewCharacter {
    /// Optional echo of the owner; must match the route when present
    #[serde(default)]
    pub username: Option<String>,
    pub char_name: String,
    pub char_class: String,
    pub lvl: i32,
    pub strength: Option<i32>,
    pub dexterity: Option<i32>,
    pub constitution: Option<i32>,
    pub intelligence: Option<i32>,
    pub wisdom: Option<i32>,
    pub charisma: Option<i32>,
}

impl NewCharacter {
    fn scores(&self) -> [(&'static str, Option<i32>); 6] {
        [
            ("strength", self.strength),
            ("dexterity", self.dexterity),
            ("constitution", self.constitution),
            ("intelligence", self.intelligence),
            ("wisdom", self.wisdom),
            ("charisma", self.charisma),
        ]
    }
}

impl Validate for NewCharacter {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_length(&mut errors, "char_name", &self.char_name, 1, 50);
        check_length(&mut errors, "char_class", &self.char_class, 1, 30);
        check_range(&mut errors, "lvl", self.lvl, 1, MAX_LEVEL);
        for (field, score) in self.scores() {
            if let Some(score) = score {
                check_range(&mut errors, field, score, MIN_SCORE, MAX_SCORE);
            }
        }
        errors
    }
}

/// Sparse character update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lvl: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strength: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dexterity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constitution: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intelligence: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wisdom: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charisma: Option<i32>,
}

impl Validate for CharacterUpdate {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(name) = &self.char_name {
            check_length(&mut errors, "char_name", name, 1, 50);
        }
        if let Some(class) = &self.char_class {
            check_length(&mut errors, "char_class", class, 1, 30);
        }
        if let Some(lvl) = self.lvl {
            check_range(&mut errors, "lvl", lvl, 1, MAX_LEVEL);
        }
        let scores = [
            ("strength", self.strength),
            ("dexterity", self.dexterity),
            ("constitution", self.constitution),
            ("intelligence", self.intelligence),
            ("wisdom", self.wisdom),
            ("charisma", self.charisma),
        ];
        for (field, score) in scores {
            if let Some(score) = score {
                check_range(&mut errors, field, score, MIN_SCORE, MAX_SCORE);
            }
        }
        errors
    }
}

/// Characters are addressed by id alone. Whether the route's username owns
/// the id is not re-checked here; the route-level self-or-admin check is
/// the only ownership gate.
pub struct CharacterService {
    pool: PgPool,
}

impl CharacterService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Every character with its owner, by id
    pub async fn find_all(&self) -> Result<Vec<OwnedCharacter>, ServiceError> {
        let characters = sqlx::query_as::<_, OwnedCharacter>(
            r#"
            SELECT c.id, c.char_name, uc.username
            FROM characters c
            JOIN user_characters uc ON uc.char_id = c.id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(characters)
    }

    /// Full character, its owner and assigned spell indexes
    pub async fn get(&self, char_id: i32) -> Result<CharacterDetail, ServiceError> {
        let found = sqlx::query_as::<_, CharacterWithOwner>(
            r#"
            SELECT c.id, c.char_name, c.char_class, c.lvl,
                   c.strength, c.dexterity, c.constitution,
                   c.intelligence, c.wisdom, c.charisma,
                   uc.username
            FROM characters c
            JOIN user_characters uc ON uc.char_id = c.id
            WHERE c.id = $1
            "#,
        )
        .bind(char_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| no_character(char_id))?;

        let spells: Vec<String> =
            sqlx::query_scalar("SELECT spell_idx FROM spell_lists WHERE char_id = $1 ORDER BY seq")
                .bind(char_id)
                .fetch_all(&self.pool)
                .await?;

        debug!("Loaded character {} with {} spells", char_id, spells.len());
        Ok(CharacterDetail {
            character: found.character,
            username: found.username,
            spells,
        })
    }

    /// Insert the character and its ownership row in one transaction.
    /// Omitted ability scores default to 10.
    pub async fn create(&self, username: &str, new: NewCharacter) -> Result<CharacterWithOwner, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<String> = sqlx::query_scalar("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;
        if owner.is_none() {
            return Err(ServiceError::NotFound(format!("No user: {}", username)));
        }

        let character = sqlx::query_as::<_, Character>(&format!(
            r#"
            INSERT INTO characters
                (char_name, char_class, lvl, strength, dexterity, constitution, intelligence, wisdom, charisma)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            CHARACTER_FIELDS
        ))
        .bind(&new.char_name)
        .bind(&new.char_class)
        .bind(new.lvl)
        .bind(new.strength.unwrap_or(DEFAULT_ABILITY_SCORE))
        .bind(new.dexterity.unwrap_or(DEFAULT_ABILITY_SCORE))
        .bind(new.constitution.unwrap_or(DEFAULT_ABILITY_SCORE))
        .bind(new.intelligence.unwrap_or(DEFAULT_ABILITY_SCORE))
        .bind(new.wisdom.unwrap_or(DEFAULT_ABILITY_SCORE))
        .bind(new.charisma.unwrap_or(DEFAULT_ABILITY_SCORE))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_characters (char_id, username) VALUES ($1, $2)")
            .bind(character.id)
            .bind(username)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!("Created character {} '{}' for '{}'", character.id, character.char_name, username);
        Ok(CharacterWithOwner {
            character,
            username: username.to_string(),
        })
    }

    /// Apply a partial update. Only `{id, char_name, char_class, lvl}` is
    /// returned, whatever changed.
    ///
    /// Assignments follow `CharacterUpdate`'s field order, not the order the
    /// client sent them in.
    pub async fn update(&self, char_id: i32, changes: CharacterUpdate) -> Result<CharacterSummary, ServiceError> {
        let update = sql_for_partial_update(into_fields(&changes), CHARACTER_COLUMNS)?;
        let sql = update.to_sql("characters", "id", SUMMARY_FIELDS);

        let character = update
            .bind(sqlx::query_as::<_, CharacterSummary>(&sql))
            .bind(char_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| no_character(char_id))?;

        debug!("Updated character {}", char_id);
        Ok(character)
    }

    /// Ownership and spell rows go with it
    pub async fn delete(&self, char_id: i32) -> Result<(), ServiceError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM characters WHERE id = $1 RETURNING id")
            .bind(char_id)
            .fetch_optional(&self.pool)
            .await?;

        match deleted {
            Some(_) => {
                info!("Deleted character {}", char_id);
                Ok(())
            }
            None => Err(no_character(char_id)),
        }
    }

    /// Assign a spell once per character. The `(char_id, spell_idx)` primary
    /// key decides duplicates, so concurrent identical assignments cannot
    /// both succeed.
    pub async fn assign_spell(&self, char_id: i32, spell_idx: &str) -> Result<SpellAssignment, ServiceError> {
        let inserted = sqlx::query_as::<_, SpellAssignment>(
            r#"
            INSERT INTO spell_lists (char_id, spell_idx)
            VALUES ($1, $2)
            ON CONFLICT (char_id, spell_idx) DO NOTHING
            RETURNING char_id, spell_idx
            "#,
        )
        .bind(char_id)
        .bind(spell_idx)
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::from);

        match inserted {
            Ok(Some(assignment)) => {
                info!("Assigned spell '{}' to character {}", spell_idx, char_id);
                Ok(assignment)
            }
            Ok(None) => Err(ServiceError::BadRequest(format!(
                "Spell {} already assigned to character {}",
                spell_idx, char_id
            ))),
            Err(ServiceError::Database(e)) if e.is_foreign_key_violation() => Err(no_character(char_id)),
            Err(e) => Err(e),
        }
    }

    pub async fn unassign_spell(&self, char_id: i32, spell_idx: &str) -> Result<(), ServiceError> {
        let removed: Option<i32> = sqlx::query_scalar(
            "DELETE FROM spell_lists WHERE char_id = $1 AND spell_idx = $2 RETURNING char_id",
        )
        .bind(char_id)
        .bind(spell_idx)
        .fetch_optional(&self.pool)
        .await?;

        match removed {
            Some(_) => {
                info!("Unassigned spell '{}' from character {}", spell_idx, char_id);
                Ok(())
            }
            None => Err(ServiceError::NotFound(format!(
                "Spell {} is not assigned to character {}",
                spell_idx, char_id
            ))),
        }
    }
}

fn no_character(char_id: i32) -> ServiceError {
    ServiceError::NotFound(format!("No character: {}", char_id))
}
