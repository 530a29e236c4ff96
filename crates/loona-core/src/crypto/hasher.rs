//! Passphrase hashing using Argon2id.
//!
//! Digests are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so each digest carries its own salt and work factor. Verification reads
//! the parameters from the digest, which keeps old records verifiable after
//! the configured work factor changes.

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{LoonaError, Result};

/// Default memory cost (19 MiB), interactive-latency friendly.
pub const DEFAULT_MEMORY_KIB: u32 = 19 * 1024;
/// Default iteration count.
pub const DEFAULT_ITERATIONS: u32 = 2;
/// Default parallelism.
pub const DEFAULT_PARALLELISM: u32 = 1;

const SALT_LENGTH: usize = 16;

/// Argon2id work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            iterations: DEFAULT_ITERATIONS,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HasherParams {
    pub fn new(memory_kib: u32, iterations: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            iterations,
            parallelism,
        }
    }

    fn to_argon2(self) -> Result<Params> {
        Params::new(self.memory_kib, self.iterations, self.parallelism, None)
            .map_err(|e| LoonaError::Crypto(format!("Invalid Argon2 parameters: {}", e)))
    }
}

/// One-way salted passphrase hasher.
#[derive(Debug, Clone)]
pub struct PassphraseHasher {
    params: Params,
}

impl PassphraseHasher {
    /// Build a hasher, rejecting parameters Argon2 cannot use.
    pub fn new(params: HasherParams) -> Result<Self> {
        Ok(Self {
            params: params.to_argon2()?,
        })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a passphrase with a fresh random salt.
    ///
    /// Two calls with the same passphrase produce different digests.
    pub fn hash(&self, passphrase: &SecretString) -> Result<String> {
        let mut salt_bytes = [0u8; SALT_LENGTH];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| LoonaError::Crypto(format!("Failed to generate salt: {}", e)))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| LoonaError::Crypto(format!("Failed to encode salt: {}", e)))?;

        let digest = self
            .argon2()
            .hash_password(passphrase.expose_secret().as_bytes(), &salt)
            .map_err(|e| LoonaError::Crypto(format!("Passphrase hashing failed: {}", e)))?;
        Ok(digest.to_string())
    }

    /// Check a passphrase against a digest produced by [`PassphraseHasher::hash`].
    ///
    /// Returns `Ok(false)` on mismatch; a digest that cannot be parsed is an error.
    pub fn verify(&self, passphrase: &SecretString, digest: &str) -> Result<bool> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| LoonaError::Crypto(format!("Malformed passphrase digest: {}", e)))?;
        match self
            .argon2()
            .verify_password(passphrase.expose_secret().as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(LoonaError::Crypto(format!(
                "Passphrase verification failed: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PassphraseHasher {
        PassphraseHasher::new(HasherParams::new(8 * 1024, 1, 1)).unwrap()
    }

    fn secret(value: &str) -> SecretString {
        SecretString::from(value.to_string())
    }

    #[test]
    fn test_hash_verifies_and_rejects() {
        let hasher = fast_hasher();
        let digest = hasher.hash(&secret("abcd")).unwrap();

        assert!(hasher.verify(&secret("abcd"), &digest).unwrap());
        assert!(!hasher.verify(&secret("abce"), &digest).unwrap());
    }

    #[test]
    fn test_hash_is_salted_per_call() {
        let hasher = fast_hasher();
        let first = hasher.hash(&secret("same-passphrase")).unwrap();
        let second = hasher.hash(&secret("same-passphrase")).unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&secret("same-passphrase"), &first).unwrap());
        assert!(hasher.verify(&secret("same-passphrase"), &second).unwrap());
    }

    #[test]
    fn test_digest_is_argon2id_phc() {
        let digest = fast_hasher().hash(&secret("abcd")).unwrap();
        assert!(digest.starts_with("$argon2id$v=19$m=8192,t=1,p=1$"));
        assert!(!digest.contains("abcd"));
    }

    #[test]
    fn test_verify_uses_embedded_params() {
        let old = fast_hasher();
        let digest = old.hash(&secret("abcd")).unwrap();

        let stronger = PassphraseHasher::new(HasherParams::new(16 * 1024, 2, 1)).unwrap();
        assert!(stronger.verify(&secret("abcd"), &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_error() {
        let result = fast_hasher().verify(&secret("abcd"), "not-a-digest");
        assert!(matches!(result, Err(LoonaError::Crypto(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = PassphraseHasher::new(HasherParams::new(8 * 1024, 0, 1));
        assert!(matches!(result, Err(LoonaError::Crypto(_))));
    }

    #[test]
    fn test_default_params() {
        let params = HasherParams::default();
        assert_eq!(params.memory_kib, 19 * 1024);
        assert!(PassphraseHasher::new(params).is_ok());
    }
}
