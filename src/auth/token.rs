use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

/// The authenticated principal carried by a token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("JWT generation error: {0}")]
    Generation(String),
    #[error("Invalid token")]
    InvalidToken,
}

/// Turns a presented token into an identity.
///
/// Verification is claims-only: nothing is looked up in storage. A
/// revocation list or extra expiry rules belong behind this trait.
pub trait TokenVerifier: Send + Sync {
    fn decode(&self, token: &str) -> Result<Identity, TokenError>;
}

/// Stateless HS256 tokens signed with the configured secret
pub struct JwtTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Option<Duration>,
}

impl JwtTokens {
    pub fn new(config: &SecurityConfig) -> Result<Self, TokenError> {
        let secret = &config.jwt_secret;
        if secret.is_empty() {
            return Err(TokenError::InvalidSecret);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry: config.token_expiry_hours.map(|h| Duration::hours(h as i64)),
        })
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            username: identity.username.clone(),
            is_admin: identity.is_admin,
            iat: now.timestamp(),
            exp: self.expiry.map(|ttl| (now + ttl).timestamp()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }
}

impl TokenVerifier for JwtTokens {
    fn decode(&self, token: &str) -> Result<Identity, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is checked when present; tokens issued without an expiry stay valid
        validation.required_spec_claims.clear();
        validation.validate_exp = true;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.into())
            .map_err(|_| TokenError::InvalidToken)
    }
}
