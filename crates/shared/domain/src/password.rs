//! Credential codec - one-way password hashing and verification.
//!
//! The domain service only ever stores and compares digests produced here.
//! The codec sits behind a trait so the hashing scheme can be replaced
//! without touching business rules.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::{DomainError, DomainResult};

/// Hashes plaintext passwords and checks plaintext against stored digests.
pub trait PasswordCodec: Send + Sync {
    /// Produce an opaque, salted digest for `plain_text`.
    ///
    /// # Errors
    /// Returns [`DomainError::Hashing`] when the underlying primitive fails.
    fn hash(&self, plain_text: &str) -> DomainResult<String>;

    /// Check `plain_text` against `digest`.
    ///
    /// A malformed digest is reported exactly like a mismatch.
    fn verify(&self, digest: &str, plain_text: &str) -> bool;
}

/// Argon2id implementation of [`PasswordCodec`] with a tunable work factor.
#[derive(Clone)]
pub struct Argon2Codec {
    params: Params,
}

impl std::fmt::Debug for Argon2Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Codec")
            .field("memory_kib", &self.params.m_cost())
            .field("iterations", &self.params.t_cost())
            .field("parallelism", &self.params.p_cost())
            .finish()
    }
}

impl Argon2Codec {
    /// Create a codec with explicit cost parameters.
    ///
    /// # Errors
    /// Returns a hashing error if Argon2 rejects the parameter combination.
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> DomainResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| DomainError::hashing(format!("invalid Argon2 parameters: {}", e)))?;
        Ok(Self { params })
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordCodec for Argon2Codec {
    fn hash(&self, plain_text: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain_text.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, digest: &str, plain_text: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        // Cost parameters are read from the digest itself.
        self.argon2()
            .verify_password(plain_text.as_bytes(), &parsed)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> Argon2Codec {
        Argon2Codec::new(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_password_hash_and_verify() {
        let codec = codec();
        let plain = "SecurePassword123!";
        let digest = codec.hash(plain).unwrap();

        assert!(codec.verify(&digest, plain));
        assert!(!codec.verify(&digest, "WrongPassword123"));
    }

    #[test]
    fn test_digest_never_equals_plaintext() {
        let digest = codec().hash("p1").unwrap();
        assert_ne!(digest, "p1");
        assert!(digest.starts_with("$argon2id$"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let codec = codec();
        let plain = "SamePassword123";
        let first = codec.hash(plain).unwrap();
        let second = codec.hash(plain).unwrap();

        assert_ne!(first, second);
        assert!(codec.verify(&first, plain));
        assert!(codec.verify(&second, plain));
    }

    #[test]
    fn test_malformed_digest_is_a_mismatch() {
        assert!(!codec().verify("not-a-phc-string", "anything"));
        assert!(!codec().verify("", ""));
    }

    #[test]
    fn test_digest_from_other_cost_still_verifies() {
        let digest = Argon2Codec::new(2048, 2, 1).unwrap().hash("secret").unwrap();
        assert!(codec().verify(&digest, "secret"));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let result = Argon2Codec::new(1, 1, 1);
        assert!(matches!(result, Err(DomainError::Hashing(_))));
    }
}
