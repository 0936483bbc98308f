//! Password hashing.
//!
//! Stored hashes are PHC strings (`$argon2id$v=19$...`), so the parameters and
//! salt travel with the hash and verification needs nothing else.
//!
//! Rows written before the switch to argon2 carry bcrypt hashes
//! (`$2a$`, `$2b$`, `$2y$`). Those still verify; new hashes are always argon2id.

use argon2::{Argon2, PasswordHasher as _, PasswordVerifier as _};
use password_hash::{PasswordHash, SaltString};
use thiserror::Error;

use bayu_core::ErrorKind;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HashingError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),

    #[error("hashing primitive failed: {0}")]
    Primitive(String),
}

impl HashingError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}

/// One-way password hashing with per-hash salt.
///
/// Both operations are CPU bound; async callers should run them off the
/// reactor (e.g. `tokio::task::spawn_blocking`).
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError>;

    /// `false` on mismatch and on a hash that does not parse.
    fn verify(&self, stored_hash: &str, plaintext: &str) -> bool;
}

/// Argon2id with the crate's default cost parameters.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, HashingError> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes).map_err(|e| HashingError::Entropy(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| HashingError::Primitive(e.to_string()))?;

        let phc = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| HashingError::Primitive(e.to_string()))?;
        Ok(phc.to_string())
    }

    fn verify(&self, stored_hash: &str, plaintext: &str) -> bool {
        if is_bcrypt(stored_hash) {
            return bcrypt::verify(plaintext, stored_hash).unwrap_or(false);
        }

        match PasswordHash::new(stored_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

fn is_bcrypt(stored_hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| stored_hash.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hash_then_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("password").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify(&hash, "password"));
        assert!(!hasher.verify(&hash, "Password"));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();

        assert_ne!(a, b);
        assert!(hasher.verify(&a, "hunter2"));
        assert!(hasher.verify(&b, "hunter2"));
    }

    #[test]
    fn malformed_stored_hash_never_verifies() {
        let hasher = Argon2PasswordHasher::new();
        assert!(!hasher.verify("", "password"));
        assert!(!hasher.verify("password", "password"));
        assert!(!hasher.verify("$2a$10$notargon", "password"));
    }

    #[test]
    fn legacy_bcrypt_hashes_still_verify() {
        let hasher = Argon2PasswordHasher::new();
        let parts = bcrypt::hash_with_result("password", 4).unwrap();

        for version in [bcrypt::Version::TwoA, bcrypt::Version::TwoB, bcrypt::Version::TwoY] {
            let legacy = parts.format_for_version(version);
            assert!(hasher.verify(&legacy, "password"), "{legacy}");
            assert!(!hasher.verify(&legacy, "Password"), "{legacy}");
        }
    }

    #[test]
    fn truncated_bcrypt_hash_is_rejected() {
        let hasher = Argon2PasswordHasher::new();
        let legacy = bcrypt::hash("password", 4).unwrap();
        assert!(!hasher.verify(&legacy[..legacy.len() - 5], "password"));
    }

    #[test]
    fn empty_password_is_hashable() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("").unwrap();
        assert!(hasher.verify(&hash, ""));
        assert!(!hasher.verify(&hash, " "));
    }

    proptest! {
        // Argon2 is deliberately slow; a handful of cases is enough.
        #![proptest_config(ProptestConfig::with_cases(4))]

        #[test]
        fn only_the_original_plaintext_verifies(pw in "[ -~]{0,24}", other in "[ -~]{0,24}") {
            let hasher = Argon2PasswordHasher::new();
            let hash = hasher.hash(&pw).unwrap();
            prop_assert!(hasher.verify(&hash, &pw));
            if other != pw {
                prop_assert!(!hasher.verify(&hash, &other));
            }
        }
    }
}
