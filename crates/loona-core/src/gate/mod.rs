//! The passphrase gate.
//!
//! For an account already signed in with the identity provider, the gate
//! decides whether journal content may be shown:
//!
//! ```text
//! Unresolved ──resolve──▶ NeedsPassphraseSetup ──set_passphrase──▶ Unlocked
//!            └─────────▶ NeedsPassphraseEntry ──enter_passphrase─▶ Unlocked
//! any state ──logout──▶ LoggedOut
//! ```
//!
//! The credential store is the only source of truth. Verification always
//! uses a freshly fetched record, and a store failure never unlocks.
//! Passphrase submissions are serialized: while one is outstanding, further
//! submissions fail fast with `LoonaError::Busy`.

mod guard;
mod state;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use secrecy::{ExposeSecret, SecretString};

use crate::account::AccountId;
use crate::credentials::{CredentialStore, RecordLookup};
use crate::crypto::{validate_passphrase, PassphraseHasher};
use crate::error::{LoonaError, Result};
use crate::identity::IdentityProvider;
use crate::journal::{JournalSession, JournalStore};
use crate::reconcile::CredentialCache;

use guard::SubmissionGuard;

pub use state::{GateState, Prompt, SessionState};

/// Passphrase gate state machine for one page/session.
///
/// Two gates for the same account (two tabs, two processes) are independent
/// and coordinate only through the credential store.
pub struct AuthGate {
    identity: Arc<dyn IdentityProvider>,
    credentials: Arc<dyn CredentialStore>,
    cache: CredentialCache,
    hasher: PassphraseHasher,
    state: Mutex<GateState>,
    pending: AtomicBool,
}

impl AuthGate {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        credentials: Arc<dyn CredentialStore>,
        cache: CredentialCache,
        hasher: PassphraseHasher,
    ) -> Self {
        Self {
            identity,
            credentials,
            cache,
            hasher,
            state: Mutex::new(GateState::Unresolved),
            pending: AtomicBool::new(false),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, GateState> {
        // The state is a plain value; a panic elsewhere cannot leave it half-written.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> GateState {
        self.lock_state().clone()
    }

    pub fn session_state(&self) -> SessionState {
        self.lock_state().session_state()
    }

    pub fn prompt(&self) -> Prompt {
        self.lock_state().prompt()
    }

    /// Whether a submission is outstanding (front ends disable their submit button).
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    fn replace_state(&self, next: GateState) {
        let mut state = self.lock_state();
        if *state != next {
            tracing::info!(from = state.name(), to = next.name(), "gate transition");
        }
        *state = next;
    }

    /// Move to `next` only if the gate is still in `expected`.
    ///
    /// A logout that lands while a store call is outstanding wins over the
    /// call's result.
    fn transition_from(&self, expected: &GateState, next: GateState) -> Result<()> {
        let mut state = self.lock_state();
        if *state != *expected {
            return Err(LoonaError::InvalidState(format!(
                "gate moved to {} while the request was in flight",
                state.name()
            )));
        }
        tracing::info!(from = state.name(), to = next.name(), "gate transition");
        *state = next;
        Ok(())
    }

    /// Argon2 runs on the blocking pool.
    async fn hash_passphrase(&self, passphrase: &SecretString) -> Result<String> {
        let hasher = self.hasher.clone();
        let passphrase = SecretString::from(passphrase.expose_secret().to_owned());
        tokio::task::spawn_blocking(move || hasher.hash(&passphrase))
            .await
            .map_err(|e| LoonaError::Crypto(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_passphrase(&self, passphrase: &SecretString, digest: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let passphrase = SecretString::from(passphrase.expose_secret().to_owned());
        let digest = digest.to_owned();
        tokio::task::spawn_blocking(move || hasher.verify(&passphrase, &digest))
            .await
            .map_err(|e| LoonaError::Crypto(format!("Verification task failed: {}", e)))?
    }

    fn purge_cache(&self, account: &AccountId) {
        if let Err(err) = self.cache.purge(account) {
            tracing::warn!(account = %account.namespace(), error = %err, "failed to purge cached credentials");
        }
    }

    /// Page entry: rebuild the state from the identity session, the
    /// credential store and the local cache.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` or `Identity` leave the state unchanged.
    pub async fn resolve(&self) -> Result<GateState> {
        let _guard = SubmissionGuard::acquire(&self.pending)?;

        let session = match self.identity.get_session().await? {
            Some(session) => session,
            None => {
                tracing::info!("no identity session; redirecting to sign-in");
                self.replace_state(GateState::LoggedOut);
                return Ok(GateState::LoggedOut);
            }
        };
        let account = session.account;
        tracing::debug!(account = %account.namespace(), "looking up passphrase record");

        let lookup = self.credentials.read_record(&account).await;
        if matches!(lookup, RecordLookup::NotFound) {
            // Whatever is cached belongs to a record that no longer exists.
            self.purge_cache(&account);
        }
        let next = GateState::after_lookup(account.clone(), lookup, |record| {
            self.cache.restore_unlock(&account, &record.passphrase_hash)
        })?;

        self.replace_state(next.clone());
        Ok(next)
    }

    /// Create the account's passphrase and unlock.
    ///
    /// # Errors
    ///
    /// - `Validation` if the passphrase is shorter than 4 characters; nothing is created
    /// - `Conflict` if another session created the record first; the gate
    ///   switches to `NeedsPassphraseEntry`
    /// - `StoreUnavailable`; state unchanged
    pub async fn set_passphrase(&self, candidate: &SecretString) -> Result<GateState> {
        let _guard = SubmissionGuard::acquire(&self.pending)?;

        let expected = self.state();
        let account = match &expected {
            GateState::NeedsPassphraseSetup { account } => account.clone(),
            other => {
                return Err(LoonaError::InvalidState(format!(
                    "cannot set a passphrase while {}",
                    other
                )))
            }
        };

        validate_passphrase(candidate.expose_secret())?;
        let hash = self.hash_passphrase(candidate).await?;
        if *self.lock_state() != expected {
            return Err(LoonaError::InvalidState(
                "gate state changed while hashing".to_string(),
            ));
        }

        match self.credentials.create_record(&account, &hash).await {
            Ok(()) => {}
            Err(LoonaError::Conflict(reason)) => {
                tracing::info!(account = %account.namespace(), "passphrase already set elsewhere; switching to entry");
                self.transition_from(
                    &expected,
                    GateState::NeedsPassphraseEntry {
                        account: account.clone(),
                    },
                )?;
                return Err(LoonaError::Conflict(reason));
            }
            Err(err) => return Err(err),
        }

        let unlocked = GateState::Unlocked {
            account: account.clone(),
        };
        self.transition_from(&expected, unlocked.clone())?;
        self.cache.remember_unlock(&account, &hash);
        Ok(unlocked)
    }

    /// Verify the passphrase against the stored record and unlock.
    ///
    /// # Errors
    ///
    /// - `IncorrectPassphrase`; state unchanged, record untouched
    /// - `NotFound` if the record has disappeared; the gate switches to
    ///   `NeedsPassphraseSetup`
    /// - `StoreUnavailable`; state unchanged
    pub async fn enter_passphrase(&self, candidate: &SecretString) -> Result<GateState> {
        let _guard = SubmissionGuard::acquire(&self.pending)?;

        let expected = self.state();
        let account = match &expected {
            GateState::NeedsPassphraseEntry { account } => account.clone(),
            other => {
                return Err(LoonaError::InvalidState(format!(
                    "cannot enter a passphrase while {}",
                    other
                )))
            }
        };

        let record = match self.credentials.read_record(&account).await {
            RecordLookup::Found(record) => record,
            RecordLookup::NotFound => {
                self.purge_cache(&account);
                self.transition_from(
                    &expected,
                    GateState::NeedsPassphraseSetup {
                        account: account.clone(),
                    },
                )?;
                return Err(LoonaError::NotFound(
                    "No passphrase is set for this account".to_string(),
                ));
            }
            RecordLookup::Unavailable(reason) => return Err(LoonaError::StoreUnavailable(reason)),
        };

        if !self.verify_passphrase(candidate, &record.passphrase_hash).await? {
            tracing::warn!(account = %account.namespace(), "incorrect passphrase");
            return Err(LoonaError::IncorrectPassphrase);
        }

        let unlocked = GateState::Unlocked {
            account: account.clone(),
        };
        self.transition_from(&expected, unlocked.clone())?;
        self.cache.remember_unlock(&account, &record.passphrase_hash);
        Ok(unlocked)
    }

    /// Send the out-of-band reset notification. The state does not change.
    pub async fn request_reset(&self) -> Result<()> {
        let _guard = SubmissionGuard::acquire(&self.pending)?;

        let account = match self.state() {
            GateState::NeedsPassphraseEntry { account } => account,
            other => {
                return Err(LoonaError::InvalidState(format!(
                    "cannot request a reset while {}",
                    other
                )))
            }
        };

        self.credentials.send_reset_notification(&account).await
    }

    /// Replace the passphrase of an unlocked account.
    ///
    /// `current` is verified against a freshly fetched record first.
    pub async fn change_passphrase(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> Result<()> {
        let _guard = SubmissionGuard::acquire(&self.pending)?;

        let expected = self.state();
        let account = match &expected {
            GateState::Unlocked { account } => account.clone(),
            other => {
                return Err(LoonaError::InvalidState(format!(
                    "cannot change the passphrase while {}",
                    other
                )))
            }
        };

        validate_passphrase(new.expose_secret())?;

        let record = match self.credentials.read_record(&account).await {
            RecordLookup::Found(record) => record,
            RecordLookup::NotFound => {
                self.purge_cache(&account);
                self.transition_from(
                    &expected,
                    GateState::NeedsPassphraseSetup {
                        account: account.clone(),
                    },
                )?;
                return Err(LoonaError::NotFound(
                    "No passphrase is set for this account".to_string(),
                ));
            }
            RecordLookup::Unavailable(reason) => return Err(LoonaError::StoreUnavailable(reason)),
        };

        if !self.verify_passphrase(current, &record.passphrase_hash).await? {
            tracing::warn!(account = %account.namespace(), "incorrect current passphrase");
            return Err(LoonaError::IncorrectPassphrase);
        }

        let hash = self.hash_passphrase(new).await?;
        self.credentials.update_record(&account, &hash).await?;

        if *self.lock_state() == expected {
            self.cache.remember_unlock(&account, &hash);
        }
        tracing::info!(account = %account.namespace(), "passphrase changed");
        Ok(())
    }

    /// Sign out from any state, purging the account's cached credentials.
    ///
    /// The local purge and the move to `LoggedOut` happen even if the
    /// identity provider fails to sign out; that failure is still returned.
    pub async fn logout(&self) -> Result<GateState> {
        let mut accounts = BTreeSet::new();
        if let Some(account) = self.state().account() {
            accounts.insert(account.clone());
        }
        match self.identity.get_session().await {
            Ok(Some(session)) => {
                accounts.insert(session.account);
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "could not read identity session during logout");
            }
        }

        let mut purge_error = None;
        for account in &accounts {
            if let Err(err) = self.cache.purge(account) {
                purge_error.get_or_insert(err);
            }
        }
        self.replace_state(GateState::LoggedOut);

        self.identity.sign_out().await?;
        if let Some(err) = purge_error {
            return Err(err);
        }
        Ok(GateState::LoggedOut)
    }

    /// Journal access for the unlocked account.
    ///
    /// # Errors
    ///
    /// Returns `LoonaError::Locked` unless the gate is `Unlocked`.
    pub fn journal<'a>(&self, store: &'a dyn JournalStore) -> Result<JournalSession<'a>> {
        match self.state() {
            GateState::Unlocked { account } => Ok(JournalSession::new(account, store)),
            _ => Err(LoonaError::Locked),
        }
    }
}
