// Tier 2: caller must be the user named in `:username`, or an admin
// (/users/:username/**)
pub mod characters;
pub mod users;

pub use characters::{
    character_create, character_delete, character_get, character_patch, spell_assign, spell_unassign,
};
pub use users::{user_delete, user_get, user_patch};
