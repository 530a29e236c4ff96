//! Journal access for an unlocked account.

use uuid::Uuid;

use super::{EntryPatch, JournalEntry, JournalStore, NewJournalEntry};
use crate::account::AccountId;
use crate::error::{LoonaError, Result};

/// Journal operations bound to the account that unlocked the gate.
///
/// Only `AuthGate::journal` hands these out, and only in the `Unlocked`
/// state.
pub struct JournalSession<'a> {
    account: AccountId,
    store: &'a dyn JournalStore,
}

impl<'a> JournalSession<'a> {
    pub(crate) fn new(account: AccountId, store: &'a dyn JournalStore) -> Self {
        Self { account, store }
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Entries, newest first.
    pub async fn entries(&self) -> Result<Vec<JournalEntry>> {
        self.store.list(&self.account).await
    }

    pub async fn entry(&self, id: &Uuid) -> Result<JournalEntry> {
        self.store
            .get(&self.account, id)
            .await?
            .ok_or_else(|| LoonaError::NotFound(format!("Entry {}", id)))
    }

    /// Resolve a full id or a unique prefix of one.
    pub async fn find(&self, id_or_prefix: &str) -> Result<JournalEntry> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return self.entry(&id).await;
        }

        let prefix = id_or_prefix.trim().to_ascii_lowercase();
        if prefix.len() < 4 {
            return Err(LoonaError::Validation(
                "Entry id prefix must be at least 4 characters".to_string(),
            ));
        }
        let mut matches: Vec<JournalEntry> = self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| entry.id.to_string().starts_with(&prefix))
            .collect();
        match matches.len() {
            0 => Err(LoonaError::NotFound(format!("Entry {}", id_or_prefix))),
            1 => Ok(matches.remove(0)),
            n => Err(LoonaError::Validation(format!(
                "Entry id prefix {} is ambiguous ({} matches)",
                id_or_prefix, n
            ))),
        }
    }

    pub async fn add(&self, entry: NewJournalEntry) -> Result<JournalEntry> {
        self.store.create(&self.account, &entry).await
    }

    pub async fn edit(&self, id: &Uuid, patch: EntryPatch) -> Result<()> {
        self.store.update(&self.account, id, &patch).await
    }

    pub async fn remove(&self, id: &Uuid) -> Result<()> {
        self.store.delete(&self.account, id).await
    }
}
