// handlers/mod.rs - three security tiers
//
// Public (no auth) -> Protected (self-or-admin) -> Elevated (admin only).
// Every tier sits behind the `identify` stage; the tier's route layer makes
// the authorization decision before any handler runs.
pub mod elevated;
pub mod protected;
pub mod public;
