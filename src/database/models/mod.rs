pub mod character;
pub mod spell_card;
pub mod user;

pub use character::{Character, CharacterDetail, CharacterWithOwner, CharacterSummary, OwnedCharacter, SpellAssignment};
pub use spell_card::{CreatedSpellCard, SpellCard};
pub use user::{PublicUser, UserDetail, UserRow};
