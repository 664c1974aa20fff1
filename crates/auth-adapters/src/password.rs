use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use domains::{DomainError, PasswordHash, PasswordHasher, Result};

/// Argon2id with a fresh random salt per hash.
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Uses the crate's recommended parameters.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Explicit memory (KiB), iteration and parallelism costs. Low costs keep
    /// seeding and test suites fast.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| DomainError::server(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn hashing_failed(err: password_hash::Error) -> DomainError {
    tracing::error!(error = %err, "password hashing failed");
    DomainError::server("password hashing failed")
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plain: &str) -> Result<PasswordHash> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(hashing_failed)?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    /// The parameters embedded in the stored hash win over `self`'s, so
    /// hashes made with other costs still verify.
    fn verify(&self, plain: &str, hash: &PasswordHash) -> Result<bool> {
        let parsed = password_hash::PasswordHash::new(hash.as_str()).map_err(hashing_failed)?;
        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(err) => Err(hashing_failed(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn hashes_verify_and_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert!(first.as_str().starts_with("$argon2id$"));
        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &first).unwrap());
        assert!(!hasher.verify("secret2", &first).unwrap());
    }

    #[test]
    fn verifies_hashes_made_with_other_costs() {
        let cheap = hasher().hash("secret1").unwrap();
        assert!(Argon2PasswordHasher::new().verify("secret1", &cheap).unwrap());
    }

    #[test]
    fn malformed_hash_is_a_server_error() {
        let err = hasher()
            .verify("secret1", &PasswordHash::new("not-a-phc-string"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Server(_)));
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(Argon2PasswordHasher::with_params(0, 0, 0).is_err());
    }
}
