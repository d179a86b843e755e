use std::sync::Arc;

use argon2::{Algorithm, Argon2, Params, PasswordHasher, PasswordVerifier, Version};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

use crate::config::HashingConfig;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("invalid hashing parameters: {0}")]
    Params(String),
    #[error("salt generation failed: {0}")]
    Salt(String),
    #[error("hashing failed: {0}")]
    Hash(String),
}

/// Salted, cost-parameterized one-way password hashing (Argon2id, PHC strings).
#[derive(Debug, Clone)]
pub struct Passwords {
    params: Params,
    /// Digest of a random password at the configured cost, checked when
    /// there is no stored digest.
    decoy: Arc<str>,
}

impl Passwords {
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;

        let mut secret = [0u8; 32];
        getrandom::getrandom(&mut secret).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let mut passwords = Self {
            params,
            decoy: Arc::from(""),
        };
        passwords.decoy = passwords.hash_bytes(&secret)?.into();
        Ok(passwords)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        self.hash_bytes(password.as_bytes())
    }

    fn hash_bytes(&self, password: &[u8]) -> Result<String, PasswordError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| PasswordError::Salt(e.to_string()))?;
        let phc = self
            .argon2()
            .hash_password(password, &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    /// Cost parameters are read from the digest, so digests made under an
    /// older cost still verify.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon2().verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Spend the same work as `verify` for an account that does not exist.
    /// Always false.
    pub fn verify_missing(&self, password: &str) -> bool {
        let _ = self.verify(password, &self.decoy);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passwords() -> Passwords {
        Passwords::new(HashingConfig::MINIMAL).unwrap()
    }

    #[test]
    fn verifies_the_right_password_only() {
        let passwords = passwords();
        let digest = passwords.hash("password1").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(passwords.verify("password1", &digest));
        assert!(!passwords.verify("password2", &digest));
    }

    #[test]
    fn salts_every_digest() {
        let passwords = passwords();
        let a = passwords.hash("same").unwrap();
        let b = passwords.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn digest_never_contains_the_password() {
        let digest = passwords().hash("hunter22").unwrap();
        assert!(!digest.contains("hunter22"));
    }

    #[test]
    fn missing_accounts_cost_a_full_verification() {
        let passwords = passwords();
        assert!(passwords.decoy.starts_with("$argon2id$v=19$m=8,t=1,p=1$"));
        assert!(PasswordHash::new(&passwords.decoy).is_ok());
        assert!(!passwords.verify_missing("password1"));
        assert!(!passwords.verify_missing(""));
    }

    #[test]
    fn garbage_digest_does_not_verify() {
        assert!(!passwords().verify("anything", "not-a-phc-string"));
    }

    #[test]
    fn rejects_impossible_cost() {
        let config = HashingConfig { memory_kib: 0, iterations: 0, parallelism: 0 };
        assert!(Passwords::new(config).is_err());
    }
}
