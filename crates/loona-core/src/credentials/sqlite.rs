//! SQLite-backed credential store.
//!
//! Stands in for the remote credential service. The primary key on
//! `account_id` is what enforces one record per account: a second insert
//! fails with a constraint violation, surfaced as `LoonaError::Conflict`.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::{CredentialStore, PassphraseRecord, RecordLookup};
use crate::account::AccountId;
use crate::error::{LoonaError, Result};
use crate::sqlite::{lock, open_file, open_memory, store_error};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS passphrase_records (
    account_id TEXT PRIMARY KEY NOT NULL,
    passphrase_hash TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS reset_notifications (
    id TEXT PRIMARY KEY NOT NULL,
    account_id TEXT NOT NULL,
    requested_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_reset_notifications_account
    ON reset_notifications (account_id);
"#;

/// A reset notification recorded in the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetNotification {
    pub id: Uuid,
    pub account: AccountId,
    pub requested_at: DateTime<Utc>,
}

/// SQLite credential store.
pub struct SqliteCredentialStore {
    conn: Mutex<Connection>,
}

impl SqliteCredentialStore {
    /// Open the store at `path`, creating the schema if needed.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(open_file(path)?)
    }

    /// Private in-memory store (tests, single-process use).
    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(open_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(store_error)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of passphrase records for `account` (0 or 1).
    pub fn record_count(&self, account: &AccountId) -> Result<usize> {
        let conn = lock(&self.conn)?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM passphrase_records WHERE account_id = ?",
                [account.as_str()],
                |row| row.get(0),
            )
            .map_err(store_error)?;
        Ok(count as usize)
    }

    /// Reset notifications sent for `account`, oldest first.
    pub fn reset_notifications(&self, account: &AccountId) -> Result<Vec<ResetNotification>> {
        let conn = lock(&self.conn)?;
        let mut stmt = conn
            .prepare(
                "SELECT id, requested_at FROM reset_notifications WHERE account_id = ? ORDER BY requested_at ASC",
            )
            .map_err(store_error)?;
        let rows = stmt
            .query_map([account.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(store_error)?;

        let mut notifications = Vec::new();
        for row in rows {
            let (id, requested_at) = row.map_err(store_error)?;
            notifications.push(ResetNotification {
                id: parse_uuid(&id)?,
                account: account.clone(),
                requested_at: parse_timestamp(&requested_at)?,
            });
        }
        Ok(notifications)
    }

    fn fetch(&self, account: &AccountId) -> Result<Option<PassphraseRecord>> {
        let conn = lock(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT passphrase_hash, created_at, updated_at FROM passphrase_records WHERE account_id = ?",
                [account.as_str()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(store_error)?;

        match row {
            Some((passphrase_hash, created_at, updated_at)) => Ok(Some(PassphraseRecord {
                account: account.clone(),
                passphrase_hash,
                created_at: parse_timestamp(&created_at)?,
                updated_at: parse_timestamp(&updated_at)?,
            })),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn create_record(&self, account: &AccountId, passphrase_hash: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let conn = lock(&self.conn)?;
        match conn.execute(
            "INSERT INTO passphrase_records (account_id, passphrase_hash, created_at, updated_at) VALUES (?, ?, ?, ?)",
            params![account.as_str(), passphrase_hash, now, now],
        ) {
            Ok(_) => {
                tracing::debug!(account = %account.namespace(), "passphrase record created");
                Ok(())
            }
            Err(err) => match store_error(err) {
                LoonaError::Conflict(_) => Err(LoonaError::Conflict(
                    "A passphrase is already set for this account".to_string(),
                )),
                other => Err(other),
            },
        }
    }

    async fn read_record(&self, account: &AccountId) -> RecordLookup {
        match self.fetch(account) {
            Ok(Some(record)) => RecordLookup::Found(record),
            Ok(None) => RecordLookup::NotFound,
            Err(err) => RecordLookup::Unavailable(err.to_string()),
        }
    }

    async fn update_record(&self, account: &AccountId, passphrase_hash: &str) -> Result<()> {
        let conn = lock(&self.conn)?;
        let updated = conn
            .execute(
                "UPDATE passphrase_records SET passphrase_hash = ?, updated_at = ? WHERE account_id = ?",
                params![passphrase_hash, Utc::now().to_rfc3339(), account.as_str()],
            )
            .map_err(store_error)?;
        if updated == 0 {
            return Err(LoonaError::NotFound(
                "No passphrase is set for this account".to_string(),
            ));
        }
        tracing::debug!(account = %account.namespace(), "passphrase record updated");
        Ok(())
    }

    async fn send_reset_notification(&self, account: &AccountId) -> Result<()> {
        let conn = lock(&self.conn)?;
        conn.execute(
            "INSERT INTO reset_notifications (id, account_id, requested_at) VALUES (?, ?, ?)",
            params![
                Uuid::now_v7().to_string(),
                account.as_str(),
                Utc::now().to_rfc3339()
            ],
        )
        .map_err(store_error)?;
        tracing::info!(account = %account.namespace(), "reset notification queued");
        Ok(())
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| LoonaError::StoreUnavailable(format!("Invalid timestamp: {}", e)))
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value)
        .map_err(|e| LoonaError::StoreUnavailable(format!("Invalid UUID: {}", e)))
}
