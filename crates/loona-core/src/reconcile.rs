//! Reconciliation between the local cache and the credential store.
//!
//! Policy:
//! - The credential store is always consulted first. A cached unlock is only
//!   honored when its cached hash equals the hash of the freshly fetched
//!   record and it has not expired.
//! - Writes go to the store first (done by the gate) and to the cache second.
//! - Cache failures degrade to "not unlocked"; they never unlock and never
//!   block a transition.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::account::AccountId;
use crate::cache::{CacheScope, LocalCache};
use crate::error::Result;

const KEY_PREFIX: &str = "loona";
// Ten years; keeps chrono durations in range.
const MAX_TTL_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// Cached fields, one key per account and field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheField {
    PassphraseHash,
    UnlockedAt,
}

impl CacheField {
    const ALL: [CacheField; 2] = [CacheField::PassphraseHash, CacheField::UnlockedAt];

    fn as_str(self) -> &'static str {
        match self {
            CacheField::PassphraseHash => "passphrase_hash",
            CacheField::UnlockedAt => "unlocked_at",
        }
    }
}

/// Namespaced cache key for `account`.
pub fn cache_key(account: &AccountId, field: CacheField) -> String {
    format!("{}/{}/{}", KEY_PREFIX, account.namespace(), field.as_str())
}

/// When and where unlocks are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    /// Also write unlocks to the persistent cache.
    pub remember_unlock: bool,
    /// Maximum age of a cached unlock; `None` means no expiry.
    pub unlock_ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            remember_unlock: false,
            unlock_ttl: None,
        }
    }
}

impl CachePolicy {
    pub fn from_seconds(remember_unlock: bool, unlock_ttl_seconds: u64) -> Self {
        let unlock_ttl = if unlock_ttl_seconds == 0 {
            None
        } else {
            let seconds = i64::try_from(unlock_ttl_seconds)
                .unwrap_or(MAX_TTL_SECONDS)
                .min(MAX_TTL_SECONDS);
            Some(Duration::seconds(seconds))
        };
        Self {
            remember_unlock,
            unlock_ttl,
        }
    }
}

/// Session- and persistent-scope caches behind one reconciliation policy.
pub struct CredentialCache {
    session: Arc<dyn LocalCache>,
    persistent: Option<Arc<dyn LocalCache>>,
    policy: CachePolicy,
}

impl CredentialCache {
    pub fn new(session: Arc<dyn LocalCache>) -> Self {
        Self {
            session,
            persistent: None,
            policy: CachePolicy::default(),
        }
    }

    pub fn with_persistent(mut self, persistent: Arc<dyn LocalCache>) -> Self {
        self.persistent = Some(persistent);
        self
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    fn layers(&self) -> Vec<(CacheScope, &Arc<dyn LocalCache>)> {
        let mut layers = vec![(CacheScope::Session, &self.session)];
        if let Some(persistent) = self.persistent.as_ref() {
            layers.push((CacheScope::Persistent, persistent));
        }
        layers
    }

    /// Record a verified unlock for `account` with the hash it was verified against.
    ///
    /// Write failures are logged and swallowed: the unlock already happened
    /// against the store, the cache only speeds up the next resolution.
    pub fn remember_unlock(&self, account: &AccountId, passphrase_hash: &str) {
        let unlocked_at = Utc::now().to_rfc3339();
        for (scope, cache) in self.layers() {
            if scope == CacheScope::Persistent && !self.policy.remember_unlock {
                continue;
            }
            let result = cache
                .set(&cache_key(account, CacheField::PassphraseHash), passphrase_hash)
                .and_then(|_| cache.set(&cache_key(account, CacheField::UnlockedAt), &unlocked_at));
            if let Err(err) = result {
                tracing::warn!(
                    account = %account.namespace(),
                    scope = ?scope,
                    error = %err,
                    "failed to cache unlock"
                );
            }
        }
    }

    /// Whether a cached unlock for `account` may be trusted against the
    /// record hash just fetched from the store.
    pub fn restore_unlock(&self, account: &AccountId, remote_hash: &str) -> bool {
        self.restore_unlock_at(account, remote_hash, Utc::now())
    }

    pub(crate) fn restore_unlock_at(
        &self,
        account: &AccountId,
        remote_hash: &str,
        now: DateTime<Utc>,
    ) -> bool {
        for (scope, cache) in self.layers() {
            if scope == CacheScope::Persistent && !self.policy.remember_unlock {
                continue;
            }
            match self.check_layer(cache.as_ref(), account, remote_hash, now) {
                Ok(LayerVerdict::Trusted) => {
                    tracing::debug!(account = %account.namespace(), scope = ?scope, "restored cached unlock");
                    return true;
                }
                Ok(LayerVerdict::Empty) => {}
                Ok(LayerVerdict::Stale) => {
                    tracing::info!(account = %account.namespace(), scope = ?scope, "discarding stale cached unlock");
                    if let Err(err) = purge_layer(cache.as_ref(), account) {
                        tracing::warn!(account = %account.namespace(), error = %err, "failed to purge stale cache");
                    }
                }
                Err(err) => {
                    tracing::warn!(account = %account.namespace(), scope = ?scope, error = %err, "cache read failed");
                }
            }
        }
        false
    }

    fn check_layer(
        &self,
        cache: &dyn LocalCache,
        account: &AccountId,
        remote_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<LayerVerdict> {
        let cached_hash = cache.get(&cache_key(account, CacheField::PassphraseHash))?;
        let unlocked_at = cache.get(&cache_key(account, CacheField::UnlockedAt))?;

        let (cached_hash, unlocked_at) = match (cached_hash, unlocked_at) {
            (None, None) => return Ok(LayerVerdict::Empty),
            (Some(hash), Some(at)) => (hash, at),
            _ => return Ok(LayerVerdict::Stale),
        };

        if cached_hash != remote_hash {
            return Ok(LayerVerdict::Stale);
        }

        let unlocked_at = match DateTime::parse_from_rfc3339(&unlocked_at) {
            Ok(parsed) => parsed.with_timezone(&Utc),
            Err(_) => return Ok(LayerVerdict::Stale),
        };
        if unlocked_at > now {
            return Ok(LayerVerdict::Stale);
        }
        if let Some(ttl) = self.policy.unlock_ttl {
            if now - unlocked_at > ttl {
                return Ok(LayerVerdict::Stale);
            }
        }
        Ok(LayerVerdict::Trusted)
    }

    /// Remove every cached field for `account` from every scope.
    ///
    /// All layers are attempted; the first failure is returned.
    pub fn purge(&self, account: &AccountId) -> Result<()> {
        let mut first_error = None;
        for (_, cache) in self.layers() {
            if let Err(err) = purge_layer(cache.as_ref(), account) {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

enum LayerVerdict {
    Empty,
    Stale,
    Trusted,
}

fn purge_layer(cache: &dyn LocalCache, account: &AccountId) -> Result<()> {
    for field in CacheField::ALL {
        cache.remove(&cache_key(account, field))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;

    fn account(value: &str) -> AccountId {
        AccountId::parse(value).unwrap()
    }

    fn caches() -> (Arc<MemoryCache>, Arc<MemoryCache>) {
        (Arc::new(MemoryCache::new()), Arc::new(MemoryCache::new()))
    }

    #[test]
    fn test_keys_are_namespaced_per_account() {
        let a = cache_key(&account("a@x.com"), CacheField::UnlockedAt);
        let b = cache_key(&account("b@x.com"), CacheField::UnlockedAt);
        assert_ne!(a, b);
        assert!(a.starts_with("loona/"));
        assert!(a.ends_with("/unlocked_at"));
        assert!(!a.contains("a@x.com"));
    }

    #[test]
    fn test_remembered_unlock_is_restored_for_same_hash() {
        let (session, _) = caches();
        let cache = CredentialCache::new(session);
        let a = account("a@x.com");

        cache.remember_unlock(&a, "digest-1");

        assert!(cache.restore_unlock(&a, "digest-1"));
    }

    #[test]
    fn test_unlock_does_not_leak_across_accounts() {
        let (session, _) = caches();
        let cache = CredentialCache::new(session);

        cache.remember_unlock(&account("a@x.com"), "digest-1");

        assert!(!cache.restore_unlock(&account("b@x.com"), "digest-1"));
    }

    #[test]
    fn test_hash_mismatch_discards_cached_unlock() {
        let (session, _) = caches();
        let cache = CredentialCache::new(session.clone());
        let a = account("a@x.com");

        cache.remember_unlock(&a, "digest-old");

        assert!(!cache.restore_unlock(&a, "digest-new"));
        assert!(session.is_empty());
    }

    #[test]
    fn test_expired_unlock_is_discarded() {
        let (session, _) = caches();
        let cache = CredentialCache::new(session.clone())
            .with_policy(CachePolicy::from_seconds(false, 60));
        let a = account("a@x.com");

        cache.remember_unlock(&a, "digest-1");

        let later = Utc::now() + Duration::seconds(120);
        assert!(!cache.restore_unlock_at(&a, "digest-1", later));
        assert!(session.is_empty());
    }

    #[test]
    fn test_partial_entry_is_stale() {
        let (session, _) = caches();
        let a = account("a@x.com");
        session
            .set(&cache_key(&a, CacheField::UnlockedAt), &Utc::now().to_rfc3339())
            .unwrap();

        let cache = CredentialCache::new(session.clone());
        assert!(!cache.restore_unlock(&a, "digest-1"));
        assert!(session.is_empty());
    }

    #[test]
    fn test_persistent_layer_only_used_when_remembering() {
        let (session, persistent) = caches();
        let a = account("a@x.com");

        let forgetful = CredentialCache::new(session.clone()).with_persistent(persistent.clone());
        forgetful.remember_unlock(&a, "digest-1");
        assert!(persistent.is_empty());

        let remembering = CredentialCache::new(Arc::new(MemoryCache::new()))
            .with_persistent(persistent.clone())
            .with_policy(CachePolicy::from_seconds(true, 0));
        remembering.remember_unlock(&a, "digest-1");
        assert_eq!(persistent.len(), 2);

        // Fresh session scope, persistent flag still honored.
        let restarted = CredentialCache::new(Arc::new(MemoryCache::new()))
            .with_persistent(persistent.clone())
            .with_policy(CachePolicy::from_seconds(true, 0));
        assert!(restarted.restore_unlock(&a, "digest-1"));
    }

    #[test]
    fn test_purge_clears_all_scopes_for_account_only() {
        let (session, persistent) = caches();
        let cache = CredentialCache::new(session.clone())
            .with_persistent(persistent.clone())
            .with_policy(CachePolicy::from_seconds(true, 0));
        let a = account("a@x.com");
        let b = account("b@x.com");

        cache.remember_unlock(&a, "digest-a");
        cache.remember_unlock(&b, "digest-b");
        cache.purge(&a).unwrap();

        assert!(!cache.restore_unlock(&a, "digest-a"));
        assert!(cache.restore_unlock(&b, "digest-b"));
        assert_eq!(session.len(), 2);
        assert_eq!(persistent.len(), 2);
    }
}
