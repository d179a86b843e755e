// Tier 3: admin token required (/users, /characters, /spell_cards)
pub mod characters;
pub mod spell_cards;
pub mod users;

pub use characters::characters_list;
pub use spell_cards::{spell_cards_create, spell_cards_list};
pub use users::{users_create, users_list};
