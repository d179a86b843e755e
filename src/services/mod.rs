pub mod character_service;
pub mod error;
pub mod spell_card_service;
pub mod user_service;

use serde::Serialize;
use serde_json::{Map, Value};

pub use character_service::{CharacterService, CharacterUpdate, NewCharacter};
pub use error::ServiceError;
pub use spell_card_service::{NewSpellCard, SpellCardService};
pub use user_service::{NewUser, UserService, UserUpdate};

/// Flatten a sparse update struct into its supplied fields, in declaration order
pub(crate) fn into_fields<T: Serialize>(changes: &T) -> Map<String, Value> {
    match serde_json::to_value(changes) {
        Ok(Value::Object(fields)) => fields,
        _ => Map::new(),
    }
}
