//! Gate states and the values derived from them.

use std::fmt;

use crate::account::AccountId;
use crate::credentials::{PassphraseRecord, RecordLookup};
use crate::error::{LoonaError, Result};

/// Passphrase gate state.
///
/// `LoggedOut` is reachable from every state. Every other state after
/// `Unresolved` carries the account it was resolved for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Unresolved,
    LoggedOut,
    NeedsPassphraseSetup { account: AccountId },
    NeedsPassphraseEntry { account: AccountId },
    Unlocked { account: AccountId },
}

/// What the front end should show for a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Not resolved yet; run `AuthGate::resolve`.
    Resolve,
    /// Redirect to the identity provider entry point.
    SignIn,
    SetPassphrase,
    EnterPassphrase,
    ShowJournal,
}

/// Transient per-session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionState {
    pub authenticated: bool,
    pub unlocked: bool,
}

impl GateState {
    pub fn account(&self) -> Option<&AccountId> {
        match self {
            GateState::Unresolved | GateState::LoggedOut => None,
            GateState::NeedsPassphraseSetup { account }
            | GateState::NeedsPassphraseEntry { account }
            | GateState::Unlocked { account } => Some(account),
        }
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self, GateState::Unlocked { .. })
    }

    pub fn session_state(&self) -> SessionState {
        SessionState {
            authenticated: self.account().is_some(),
            unlocked: self.is_unlocked(),
        }
    }

    pub fn prompt(&self) -> Prompt {
        match self {
            GateState::Unresolved => Prompt::Resolve,
            GateState::LoggedOut => Prompt::SignIn,
            GateState::NeedsPassphraseSetup { .. } => Prompt::SetPassphrase,
            GateState::NeedsPassphraseEntry { .. } => Prompt::EnterPassphrase,
            GateState::Unlocked { .. } => Prompt::ShowJournal,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateState::Unresolved => "unresolved",
            GateState::LoggedOut => "logged_out",
            GateState::NeedsPassphraseSetup { .. } => "needs_passphrase_setup",
            GateState::NeedsPassphraseEntry { .. } => "needs_passphrase_entry",
            GateState::Unlocked { .. } => "unlocked",
        }
    }

    /// State for a signed-in `account` given the result of a record lookup.
    ///
    /// `trust_cached_unlock` is only consulted when a record exists, and
    /// receives the freshly fetched record.
    pub(crate) fn after_lookup(
        account: AccountId,
        lookup: RecordLookup,
        trust_cached_unlock: impl FnOnce(&PassphraseRecord) -> bool,
    ) -> Result<GateState> {
        match lookup {
            RecordLookup::Found(record) => {
                if trust_cached_unlock(&record) {
                    Ok(GateState::Unlocked { account })
                } else {
                    Ok(GateState::NeedsPassphraseEntry { account })
                }
            }
            RecordLookup::NotFound => Ok(GateState::NeedsPassphraseSetup { account }),
            RecordLookup::Unavailable(reason) => Err(LoonaError::StoreUnavailable(reason)),
        }
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account() -> AccountId {
        AccountId::parse("a@x.com").unwrap()
    }

    fn record() -> PassphraseRecord {
        PassphraseRecord {
            account: account(),
            passphrase_hash: "digest".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_not_found_leads_to_setup() {
        let state = GateState::after_lookup(account(), RecordLookup::NotFound, |_| true).unwrap();
        assert_eq!(state, GateState::NeedsPassphraseSetup { account: account() });
        assert_eq!(state.prompt(), Prompt::SetPassphrase);
    }

    #[test]
    fn test_found_leads_to_entry_unless_cache_trusted() {
        let state =
            GateState::after_lookup(account(), RecordLookup::Found(record()), |_| false).unwrap();
        assert_eq!(state, GateState::NeedsPassphraseEntry { account: account() });

        let state =
            GateState::after_lookup(account(), RecordLookup::Found(record()), |r| {
                r.passphrase_hash == "digest"
            })
            .unwrap();
        assert!(state.is_unlocked());
    }

    #[test]
    fn test_unavailable_is_an_error_never_unlocked() {
        let result = GateState::after_lookup(
            account(),
            RecordLookup::Unavailable("timeout".to_string()),
            |_| true,
        );
        assert!(matches!(result, Err(LoonaError::StoreUnavailable(_))));
    }

    #[test]
    fn test_session_state_flags() {
        assert_eq!(GateState::LoggedOut.session_state(), SessionState::default());
        assert_eq!(
            GateState::NeedsPassphraseEntry { account: account() }.session_state(),
            SessionState {
                authenticated: true,
                unlocked: false
            }
        );
        assert_eq!(
            GateState::Unlocked { account: account() }.session_state(),
            SessionState {
                authenticated: true,
                unlocked: true
            }
        );
    }
}
