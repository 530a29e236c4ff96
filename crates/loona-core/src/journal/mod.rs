//! Journal store interface and entry types.
//!
//! Every operation takes the owning account and the store filters on it, so
//! an entry id alone never grants access to another account's entry.

mod row;
mod session;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountId;
use crate::error::{LoonaError, Result};

pub use session::JournalSession;
pub use sqlite::SqliteJournalStore;

/// Maximum title length in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Maximum body size in bytes.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A stored journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: Uuid,
    pub account: AccountId,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Builder for a new entry.
#[derive(Debug, Clone)]
pub struct NewJournalEntry {
    pub title: String,
    pub body: String,
    /// Defaults to the time of insertion
    pub created_at: Option<DateTime<Utc>>,
}

impl NewJournalEntry {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        validate_body(&self.body)
    }
}

/// Fields to change on an existing entry. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct EntryPatch {
    pub title: Option<String>,
    pub body: Option<String>,
}

impl EntryPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(LoonaError::Validation("Nothing to update".to_string()));
        }
        if let Some(title) = self.title.as_deref() {
            validate_title(title)?;
        }
        if let Some(body) = self.body.as_deref() {
            validate_body(body)?;
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(LoonaError::Validation("Title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(LoonaError::Validation(format!(
            "Title too long (max {} characters)",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

fn validate_body(body: &str) -> Result<()> {
    if body.trim().is_empty() {
        return Err(LoonaError::Validation("Entry cannot be empty".to_string()));
    }
    if body.len() > MAX_BODY_BYTES {
        return Err(LoonaError::Validation(format!(
            "Entry too large (max {} bytes)",
            MAX_BODY_BYTES
        )));
    }
    Ok(())
}

/// Journal store interface.
#[async_trait]
pub trait JournalStore: Send + Sync {
    /// Entries for `account`, newest first.
    async fn list(&self, account: &AccountId) -> Result<Vec<JournalEntry>>;

    /// Returns `Ok(None)` if the entry does not exist or belongs to another account.
    async fn get(&self, account: &AccountId, id: &Uuid) -> Result<Option<JournalEntry>>;

    async fn create(&self, account: &AccountId, entry: &NewJournalEntry) -> Result<JournalEntry>;

    /// # Errors
    ///
    /// Returns `LoonaError::NotFound` if no entry with `id` belongs to `account`.
    async fn update(&self, account: &AccountId, id: &Uuid, patch: &EntryPatch) -> Result<()>;

    /// # Errors
    ///
    /// Returns `LoonaError::NotFound` if no entry with `id` belongs to `account`.
    async fn delete(&self, account: &AccountId, id: &Uuid) -> Result<()>;
}
