//! Application context for the Loona CLI.
//!
//! Combines CLI arguments with the lazily-loaded config, and wires the core
//! collaborators (identity session file, SQLite stores, unlock caches) into
//! an `AuthGate`.

use std::path::PathBuf;
use std::sync::Arc;

use once_cell::unsync::OnceCell;

use loona_core::cache::FileCache;
use loona_core::credentials::SqliteCredentialStore;
use loona_core::identity::FileIdentityProvider;
use loona_core::journal::SqliteJournalStore;
use loona_core::{AuthGate, CachePolicy, CredentialCache, PassphraseHasher};

use crate::cli::Cli;
use crate::config::{
    load_config, parse_timezone, persistent_cache_path, session_cache_path, session_file_path,
    LoonaConfig,
};
use crate::ui::UiContext;

use super::resolver::{resolve_config_path, resolve_store_path};

/// Application context that bundles CLI args with configuration.
pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<LoonaConfig>,
    credentials: OnceCell<Arc<SqliteCredentialStore>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
            credentials: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    pub fn ui(&self, json: bool) -> UiContext {
        UiContext::from_env(json, self.cli.no_color)
    }

    /// Get the configuration, loading it lazily if needed.
    pub fn config(&self) -> anyhow::Result<&LoonaConfig> {
        self.config
            .get_or_try_init(|| load_config(&resolve_config_path()?))
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        resolve_store_path(self.cli, self.config()?)
    }

    /// Configured display timezone; `None` means UTC.
    pub fn timezone(&self) -> anyhow::Result<Option<chrono_tz::Tz>> {
        self.config()?
            .ui
            .timezone
            .as_deref()
            .map(parse_timezone)
            .transpose()
    }

    pub fn editor(&self) -> anyhow::Result<Option<&str>> {
        Ok(self.config()?.ui.editor.as_deref())
    }

    pub fn identity(&self) -> anyhow::Result<FileIdentityProvider> {
        Ok(FileIdentityProvider::new(session_file_path()?))
    }

    pub fn credentials(&self) -> anyhow::Result<Arc<SqliteCredentialStore>> {
        let store = self.credentials.get_or_try_init(|| {
            let path = self.store_path()?;
            tracing::debug!(path = %path.display(), "opening credential store");
            Ok::<_, anyhow::Error>(Arc::new(SqliteCredentialStore::open(&path)?))
        })?;
        Ok(store.clone())
    }

    pub fn journal_store(&self) -> anyhow::Result<SqliteJournalStore> {
        Ok(SqliteJournalStore::open(&self.store_path()?)?)
    }

    fn credential_cache(&self) -> anyhow::Result<CredentialCache> {
        let security = &self.config()?.security;
        let policy = CachePolicy::from_seconds(security.remember_unlock, security.unlock_ttl_seconds);
        Ok(
            CredentialCache::new(Arc::new(FileCache::new(session_cache_path()?)))
                .with_persistent(Arc::new(FileCache::new(persistent_cache_path()?)))
                .with_policy(policy),
        )
    }

    /// Build the passphrase gate for this invocation.
    pub fn gate(&self) -> anyhow::Result<AuthGate> {
        let hasher = PassphraseHasher::new(self.config()?.hasher_params())?;
        Ok(AuthGate::new(
            Arc::new(self.identity()?),
            self.credentials()?,
            self.credential_cache()?,
            hasher,
        ))
    }
}
