//! Shared SQLite plumbing for the store backends.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::ffi;
use rusqlite::Connection;

use crate::error::{LoonaError, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) a database file shared by concurrent clients.
pub(crate) fn open_file(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LoonaError::StoreUnavailable(format!(
                    "Failed to create store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    let conn = Connection::open(path).map_err(store_error)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(store_error)?;
    Ok(conn)
}

pub(crate) fn open_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(store_error)
}

/// Lock the database connection, returning an error if the mutex is poisoned.
pub(crate) fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| LoonaError::StoreUnavailable("SQLite connection poisoned".to_string()))
}

/// Map a SQLite failure onto the store error taxonomy.
///
/// Primary-key and unique violations are conflicts; everything else,
/// including NOT NULL and CHECK failures, is treated as the store being
/// unavailable.
pub(crate) fn store_error(err: rusqlite::Error) -> LoonaError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if matches!(
                failure.extended_code,
                ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
            ) =>
        {
            LoonaError::Conflict(format!("SQLite constraint: {}", err))
        }
        other => LoonaError::StoreUnavailable(format!("SQLite error: {}", other)),
    }
}
