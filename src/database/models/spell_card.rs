use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SpellCard {
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

/// A freshly created card; `idx` is reported as `index`, like the external catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSpellCard {
    pub index: String,
    pub name: String,
    pub description: String,
    pub level: i32,
    pub range: Option<String>,
    pub damage: Option<String>,
    pub area_of_effect: Option<String>,
    pub school: Option<String>,
    pub classes: Option<String>,
}

impl From<SpellCard> for CreatedSpellCard {
    fn from(card: SpellCard) -> Self {
        Self {
            index: card.idx,
            name: card.name,
            description: card.description,
            level: card.level,
            range: card.range,
            damage: card.damage,
            area_of_effect: card.area_of_effect,
            school: card.school,
            classes: card.classes,
        }
    }
}
