//! Entry row type for database queries.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::JournalEntry;
use crate::account::AccountId;
use crate::error::{LoonaError, Result};

/// Raw row data from the entries table, before parsing into domain types.
#[derive(Debug)]
pub struct EntryRow {
    pub id: String,
    pub account_id: String,
    pub title: String,
    pub body: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl EntryRow {
    pub const COLUMNS: &'static str = "id, account_id, title, body, created_at, updated_at";

    pub fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            title: row.get(2)?,
            body: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|e| LoonaError::StoreUnavailable(format!("Invalid timestamp: {}", e)))
}

impl TryFrom<EntryRow> for JournalEntry {
    type Error = LoonaError;

    fn try_from(row: EntryRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| LoonaError::StoreUnavailable(format!("Invalid entry UUID: {}", e)))?;
        let account = AccountId::parse(&row.account_id)?;
        let created_at = parse_timestamp(&row.created_at)?;
        let updated_at = row.updated_at.as_deref().map(parse_timestamp).transpose()?;

        Ok(JournalEntry {
            id,
            account,
            title: row.title,
            body: row.body,
            created_at,
            updated_at,
        })
    }
}
