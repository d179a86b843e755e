use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{JwtTokens, Passwords, TokenVerifier};
use crate::config::AppConfig;
use crate::services::{CharacterService, SpellCardService, UserService};

/// Shared per-process state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub tokens: Arc<JwtTokens>,
    pub passwords: Passwords,
}

impl AppState {
    pub fn new(config: &AppConfig, pool: PgPool) -> anyhow::Result<Self> {
        let tokens = JwtTokens::new(&config.security)?;
        let passwords = Passwords::new(config.hashing)?;
        Ok(Self {
            pool,
            tokens: Arc::new(tokens),
            passwords,
        })
    }

    pub fn verifier(&self) -> &dyn TokenVerifier {
        self.tokens.as_ref()
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.pool.clone(), self.passwords.clone())
    }

    pub fn characters(&self) -> CharacterService {
        CharacterService::new(self.pool.clone())
    }

    pub fn spell_cards(&self) -> SpellCardService {
        SpellCardService::new(self.pool.clone())
    }
}
