pub mod auth;
pub mod response;

pub use auth::{bearer_token, identify, require_admin, require_authenticated, require_self_or_admin};
pub use response::envelope_method_not_allowed;
