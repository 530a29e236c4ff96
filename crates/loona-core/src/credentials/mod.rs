//! Credential store interface.
//!
//! The credential store is the single source of truth for passphrase
//! records: one record per account, created once through setup and only
//! replaced through an explicit update.

mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::Result;

pub use sqlite::{ResetNotification, SqliteCredentialStore};

/// A stored passphrase verifier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseRecord {
    pub account: AccountId,
    /// Argon2id PHC digest
    pub passphrase_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for PassphraseRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PassphraseRecord")
            .field("account", &self.account)
            .field("passphrase_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Outcome of a record lookup.
///
/// `NotFound` is an expected signal that drives the setup-vs-entry branch,
/// not a fault.
#[derive(Debug, Clone)]
pub enum RecordLookup {
    Found(PassphraseRecord),
    NotFound,
    Unavailable(String),
}

/// Remote credential store interface.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Create the record for `account`.
    ///
    /// # Errors
    ///
    /// Returns `LoonaError::Conflict` if a record already exists and
    /// `LoonaError::StoreUnavailable` if the store cannot be reached.
    async fn create_record(&self, account: &AccountId, passphrase_hash: &str) -> Result<()>;

    /// Look up the record for `account`.
    async fn read_record(&self, account: &AccountId) -> RecordLookup;

    /// Replace the hash of an existing record.
    ///
    /// # Errors
    ///
    /// Returns `LoonaError::NotFound` if no record exists.
    async fn update_record(&self, account: &AccountId, passphrase_hash: &str) -> Result<()>;

    /// Send an out-of-band passphrase reset notification.
    async fn send_reset_notification(&self, account: &AccountId) -> Result<()>;
}
