//! Password hashing and verification using Argon2
//!
//! Uses the argon2id variant with default parameters. Hashes are PHC
//! strings carrying their own salt and parameters.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2,
};

/// Password hashing failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way hashing of secrets
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext secret into an opaque, self-describing string
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Check a plaintext secret against a stored hash
    fn verify(&self, plaintext: &str, hash: &str) -> Result<(), PasswordError>;
}

/// Argon2id hasher
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        use argon2::password_hash::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<(), PasswordError> {
        use argon2::password_hash::PasswordVerifier as _;

        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .map_err(|e| match e {
                argon2::password_hash::Error::Password => PasswordError::Mismatch,
                other => PasswordError::Hash(other.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let password = "correct-horse-battery-staple";
        let hash = hasher.hash(password).unwrap();

        assert!(hash.starts_with("$argon2"));
        assert_ne!(hash, password);

        assert_eq!(hasher.verify(password, &hash), Ok(()));
        assert_eq!(
            hasher.verify("wrong-password", &hash),
            Err(PasswordError::Mismatch)
        );
    }

    #[test]
    fn test_different_salts() {
        let hasher = Argon2Hasher::new();
        let hash1 = hasher.hash("same-password").unwrap();
        let hash2 = hasher.hash("same-password").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same-password", &hash1).is_ok());
        assert!(hasher.verify("same-password", &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let hasher = Argon2Hasher::new();
        assert!(matches!(
            hasher.verify("password", "not-a-valid-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }
}
