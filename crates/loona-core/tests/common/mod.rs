//! Shared collaborators for gate integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use loona_core::cache::{LocalCache, MemoryCache};
use loona_core::credentials::{CredentialStore, PassphraseRecord, RecordLookup};
use loona_core::identity::{IdentityProvider, Session};
use loona_core::{AccountId, AuthGate, CredentialCache, HasherParams, LoonaError, PassphraseHasher};

pub fn account(value: &str) -> AccountId {
    AccountId::parse(value).expect("valid account")
}

pub fn secret(value: &str) -> secrecy::SecretString {
    secrecy::SecretString::from(value.to_string())
}

/// Cheap work factor so tests stay fast.
pub fn hasher() -> PassphraseHasher {
    PassphraseHasher::new(HasherParams::new(8 * 1024, 1, 1)).expect("hasher params")
}

pub fn memory_cache() -> CredentialCache {
    CredentialCache::new(Arc::new(MemoryCache::new()))
}

pub fn gate(
    identity: Arc<dyn IdentityProvider>,
    credentials: Arc<dyn CredentialStore>,
    cache: CredentialCache,
) -> AuthGate {
    AuthGate::new(identity, credentials, cache, hasher())
}

/// Identity provider holding one in-memory session.
pub struct StaticIdentity {
    session: Mutex<Option<Session>>,
    fail_sign_out: bool,
}

impl StaticIdentity {
    pub fn signed_in(account: AccountId) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Some(Session::new(account))),
            fail_sign_out: false,
        })
    }

    pub fn signed_out() -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(None),
            fail_sign_out: false,
        })
    }

    pub fn failing_sign_out(account: AccountId) -> Arc<Self> {
        Arc::new(Self {
            session: Mutex::new(Some(Session::new(account))),
            fail_sign_out: true,
        })
    }

    pub fn sign_in(&self, account: AccountId) {
        *self.session.lock().unwrap() = Some(Session::new(account));
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    async fn get_session(&self) -> loona_core::Result<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    async fn sign_out(&self) -> loona_core::Result<()> {
        if self.fail_sign_out {
            return Err(LoonaError::Identity("provider offline".to_string()));
        }
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// In-memory credential store whose records can be removed behind the gate's back.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: Mutex<HashMap<AccountId, PassphraseRecord>>,
    notifications: Mutex<Vec<AccountId>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn forget(&self, account: &AccountId) {
        self.records.lock().unwrap().remove(account);
    }

    pub fn hash_of(&self, account: &AccountId) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(account)
            .map(|record| record.passphrase_hash.clone())
    }

    pub fn notifications(&self) -> Vec<AccountId> {
        self.notifications.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_record(&self, account: &AccountId, passphrase_hash: &str) -> loona_core::Result<()> {
        let mut records = self.records.lock().unwrap();
        if records.contains_key(account) {
            return Err(LoonaError::Conflict("record exists".to_string()));
        }
        let now = Utc::now();
        records.insert(
            account.clone(),
            PassphraseRecord {
                account: account.clone(),
                passphrase_hash: passphrase_hash.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn read_record(&self, account: &AccountId) -> RecordLookup {
        match self.records.lock().unwrap().get(account) {
            Some(record) => RecordLookup::Found(record.clone()),
            None => RecordLookup::NotFound,
        }
    }

    async fn update_record(&self, account: &AccountId, passphrase_hash: &str) -> loona_core::Result<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(account)
            .ok_or_else(|| LoonaError::NotFound("record".to_string()))?;
        record.passphrase_hash = passphrase_hash.to_string();
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn send_reset_notification(&self, account: &AccountId) -> loona_core::Result<()> {
        self.notifications.lock().unwrap().push(account.clone());
        Ok(())
    }
}

/// A store that is never reachable.
pub struct UnavailableStore;

#[async_trait]
impl CredentialStore for UnavailableStore {
    async fn create_record(&self, _account: &AccountId, _hash: &str) -> loona_core::Result<()> {
        Err(LoonaError::StoreUnavailable("connection refused".to_string()))
    }

    async fn read_record(&self, _account: &AccountId) -> RecordLookup {
        RecordLookup::Unavailable("connection refused".to_string())
    }

    async fn update_record(&self, _account: &AccountId, _hash: &str) -> loona_core::Result<()> {
        Err(LoonaError::StoreUnavailable("connection refused".to_string()))
    }

    async fn send_reset_notification(&self, _account: &AccountId) -> loona_core::Result<()> {
        Err(LoonaError::StoreUnavailable("connection refused".to_string()))
    }
}

/// Wraps a store and yields to the executor before every call, so joined
/// futures interleave at the store boundary like real network round trips.
pub struct YieldingStore {
    inner: Arc<dyn CredentialStore>,
}

impl YieldingStore {
    pub fn new(inner: Arc<dyn CredentialStore>) -> Arc<Self> {
        Arc::new(Self { inner })
    }
}

#[async_trait]
impl CredentialStore for YieldingStore {
    async fn create_record(&self, account: &AccountId, passphrase_hash: &str) -> loona_core::Result<()> {
        tokio::task::yield_now().await;
        self.inner.create_record(account, passphrase_hash).await
    }

    async fn read_record(&self, account: &AccountId) -> RecordLookup {
        tokio::task::yield_now().await;
        self.inner.read_record(account).await
    }

    async fn update_record(&self, account: &AccountId, passphrase_hash: &str) -> loona_core::Result<()> {
        tokio::task::yield_now().await;
        self.inner.update_record(account, passphrase_hash).await
    }

    async fn send_reset_notification(&self, account: &AccountId) -> loona_core::Result<()> {
        tokio::task::yield_now().await;
        self.inner.send_reset_notification(account).await
    }
}

/// A cache whose every operation fails.
pub struct BrokenCache;

impl LocalCache for BrokenCache {
    fn get(&self, _key: &str) -> loona_core::Result<Option<String>> {
        Err(LoonaError::Storage("disk full".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> loona_core::Result<()> {
        Err(LoonaError::Storage("disk full".to_string()))
    }

    fn remove(&self, _key: &str) -> loona_core::Result<()> {
        Err(LoonaError::Storage("disk full".to_string()))
    }
}
