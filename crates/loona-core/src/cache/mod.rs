//! Local key/value cache.
//!
//! Holds the cached passphrase hash and unlock flag for an account. The
//! cache is a read optimization: nothing in it is authoritative, and every
//! key is namespaced by account so one account's entries never satisfy a
//! lookup for another.

mod file;
mod memory;

use crate::error::Result;

pub use file::FileCache;
pub use memory::MemoryCache;

/// Lifetime of a cache backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheScope {
    /// Cleared when the session ends (process exit, reboot, browser close).
    Session,
    /// Survives restarts on this device.
    Persistent,
}

/// Local key/value store.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
