use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ability score used when none is supplied at creation
pub const DEFAULT_ABILITY_SCORE: i32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Character {
    pub id: i32,
    pub char_name: String,
    pub char_class: String,
    pub lvl: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

/// `{id, char_name, char_class, lvl}`: owned-character listings and update echoes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CharacterSummary {
    pub id: i32,
    pub char_name: String,
    pub char_class: String,
    pub lvl: i32,
}

/// Admin listing row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct OwnedCharacter {
    pub id: i32,
    pub char_name: String,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CharacterWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub character: Character,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDetail {
    #[serde(flatten)]
    pub character: Character,
    pub username: String,
    pub spells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SpellAssignment {
    pub char_id: i32,
    pub spell_idx: String,
}
