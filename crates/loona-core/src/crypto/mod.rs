//! Passphrase hashing and validation.
//!
//! - **Argon2id** (PHC string digests) for the passphrase gate verifier
//! - Plaintext passphrases are carried as `SecretString` and zeroized on drop
//!
//! ## Threat Model
//!
//! We defend against:
//! - Offline brute-force of a leaked passphrase record
//! - Plaintext passphrases reaching disk or logs
//!
//! We do NOT defend against:
//! - Compromised OS / keylogger
//! - Access to an unlocked session

pub mod hasher;
pub mod passphrase;

pub use hasher::{HasherParams, PassphraseHasher};
pub use passphrase::{validate_passphrase, MIN_PASSPHRASE_LENGTH};
