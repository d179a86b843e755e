// Tier 1: no authentication required (/auth/*, /health). /auth/whoami only
// needs a valid token.
pub mod auth;
pub mod health;

pub use auth::{auth_register, auth_token, auth_whoami};
pub use health::health;
