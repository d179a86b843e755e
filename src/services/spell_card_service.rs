use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::{CreatedSpellCard, SpellCard};
use crate::validate::{check_length, check_range, Validate};

use super::ServiceError;

const SPELL_CARD_FIELDS: &str = "idx, name, description, level, range, damage, area_of_effect, school, classes";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewSpellCard {
    pub idx: String,
    pub name: String,
    pub description: String,
    pub level: i32,
    pub range: Option<String>,
    pub damage: Option<String>,
    pub area_of_effect: Option<String>,
    pub school: Option<String>,
    pub classes: Option<String>,
}

impl Validate for NewSpellCard {
    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        check_length(&mut errors, "idx", &self.idx, 1, 100);
        check_length(&mut errors, "name", &self.name, 1, 100);
        check_length(&mut errors, "description", &self.description, 1, 10_000);
        check_range(&mut errors, "level", self.level, 0, 9);
        errors
    }
}

/// Spell card catalog. Entries are immutable once created.
pub struct SpellCardService {
    pool: PgPool,
}

impl SpellCardService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<SpellCard>, ServiceError> {
        let cards = sqlx::query_as::<_, SpellCard>(&format!(
            "SELECT {} FROM spell_cards ORDER BY idx",
            SPELL_CARD_FIELDS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(cards)
    }

    /// Insert a new card; an existing `idx` is a client error
    pub async fn create(&self, card: NewSpellCard) -> Result<CreatedSpellCard, ServiceError> {
        let created = sqlx::query_as::<_, SpellCard>(&format!(
            r#"
            INSERT INTO spell_cards ({fields})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (idx) DO NOTHING
            RETURNING {fields}
            "#,
            fields = SPELL_CARD_FIELDS
        ))
        .bind(&card.idx)
        .bind(&card.name)
        .bind(&card.description)
        .bind(card.level)
        .bind(&card.range)
        .bind(&card.damage)
        .bind(&card.area_of_effect)
        .bind(&card.school)
        .bind(&card.classes)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ServiceError::BadRequest(format!("Spell card {} already exists", card.idx)))?;

        info!("Created spell card '{}'", created.idx);
        Ok(created.into())
    }
}
