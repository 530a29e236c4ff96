//! SQLite-backed journal store.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::row::EntryRow;
use super::{EntryPatch, JournalEntry, JournalStore, NewJournalEntry};
use crate::account::AccountId;
use crate::error::{LoonaError, Result};
use crate::sqlite::{lock, open_file, open_memory, store_error};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS journal_entries (
    id TEXT PRIMARY KEY NOT NULL,
    account_id TEXT NOT NULL,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_journal_entries_account_created
    ON journal_entries (account_id, created_at);
"#;

// Fixed-width UTC timestamps so lexical order matches chronological order.
fn timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// SQLite journal store.
pub struct SqliteJournalStore {
    conn: Mutex<Connection>,
}

impl SqliteJournalStore {
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(open_file(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(open_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(store_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl JournalStore for SqliteJournalStore {
    async fn list(&self, account: &AccountId) -> Result<Vec<JournalEntry>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE account_id = ? ORDER BY created_at DESC, id DESC",
            EntryRow::COLUMNS
        );
        let mut stmt = conn.prepare(&sql).map_err(store_error)?;
        let rows = stmt
            .query_map([account.as_str()], EntryRow::from_sql)
            .map_err(store_error)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(store_error)?.try_into()?);
        }
        Ok(entries)
    }

    async fn get(&self, account: &AccountId, id: &Uuid) -> Result<Option<JournalEntry>> {
        let conn = lock(&self.conn)?;
        let sql = format!(
            "SELECT {} FROM journal_entries WHERE account_id = ? AND id = ?",
            EntryRow::COLUMNS
        );
        let row = conn
            .query_row(
                &sql,
                params![account.as_str(), id.to_string()],
                EntryRow::from_sql,
            )
            .optional()
            .map_err(store_error)?;
        row.map(JournalEntry::try_from).transpose()
    }

    async fn create(&self, account: &AccountId, entry: &NewJournalEntry) -> Result<JournalEntry> {
        entry.validate()?;

        let stored = JournalEntry {
            id: Uuid::now_v7(),
            account: account.clone(),
            title: entry.title.trim().to_string(),
            body: entry.body.clone(),
            created_at: entry.created_at.unwrap_or_else(Utc::now).trunc_subsecs(6),
            updated_at: None,
        };

        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO journal_entries (id, account_id, title, body, created_at, updated_at) VALUES (?, ?, ?, ?, ?, NULL)",
            params![
                stored.id.to_string(),
                account.as_str(),
                stored.title,
                stored.body,
                timestamp(stored.created_at),
            ],
        )
        .map_err(store_error)?;

        tracing::debug!(account = %account.namespace(), entry = %stored.id, "journal entry created");
        Ok(stored)
    }

    async fn update(&self, account: &AccountId, id: &Uuid, patch: &EntryPatch) -> Result<()> {
        patch.validate()?;

        let conn = lock(&self.conn)?;
        let updated = conn
            .execute(
                "UPDATE journal_entries SET title = COALESCE(?, title), body = COALESCE(?, body), updated_at = ? WHERE account_id = ? AND id = ?",
                params![
                    patch.title.as_deref().map(str::trim),
                    patch.body.as_deref(),
                    timestamp(Utc::now()),
                    account.as_str(),
                    id.to_string(),
                ],
            )
            .map_err(store_error)?;
        if updated == 0 {
            return Err(LoonaError::NotFound(format!("Entry {}", id)));
        }
        tracing::debug!(account = %account.namespace(), entry = %id, "journal entry updated");
        Ok(())
    }

    async fn delete(&self, account: &AccountId, id: &Uuid) -> Result<()> {
        let conn = lock(&self.conn)?;
        let deleted = conn
            .execute(
                "DELETE FROM journal_entries WHERE account_id = ? AND id = ?",
                params![account.as_str(), id.to_string()],
            )
            .map_err(store_error)?;
        if deleted == 0 {
            return Err(LoonaError::NotFound(format!("Entry {}", id)));
        }
        tracing::debug!(account = %account.namespace(), entry = %id, "journal entry deleted");
        Ok(())
    }
}
