pub mod password;
pub mod policy;
pub mod token;

pub use password::{PasswordError, Passwords};
pub use token::{Claims, Identity, JwtTokens, TokenError, TokenVerifier};
