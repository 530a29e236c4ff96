//! # Loona Core
//!
//! Core library for Loona, a personal journal whose content sits behind a
//! per-account passphrase gate, on top of an external identity provider.
//!
//! This crate holds the domain logic and the collaborator seams,
//! independent of the CLI.
//!
//! ## Architecture
//!
//! - **gate**: the passphrase gate state machine (`AuthGate`)
//! - **crypto**: passphrase validation and Argon2id hashing
//! - **credentials**: the credential store seam and its SQLite backend
//! - **identity**: the identity provider seam and a session-file backend
//! - **cache**: local key/value caches (process memory, private file)
//! - **reconcile**: when a cached unlock may be trusted
//! - **journal**: journal entries, scoped by account

pub mod account;
pub mod cache;
pub mod credentials;
pub mod crypto;
pub mod error;
pub mod fs;
pub mod gate;
pub mod identity;
pub mod journal;
pub mod reconcile;

mod sqlite;

pub use account::AccountId;
pub use credentials::{CredentialStore, PassphraseRecord, RecordLookup};
pub use crypto::{HasherParams, PassphraseHasher};
pub use error::{LoonaError, Result};
pub use gate::{AuthGate, GateState, Prompt, SessionState};
pub use identity::{IdentityProvider, Session};
pub use journal::{JournalEntry, JournalSession, JournalStore};
pub use reconcile::{CachePolicy, CredentialCache};

/// Core version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
