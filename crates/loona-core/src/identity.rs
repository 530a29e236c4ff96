//! Identity provider seam.
//!
//! The provider handshake itself is opaque: Loona only needs to know which
//! account (if any) is signed in, and to be able to sign it out.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::{LoonaError, Result};
use crate::fs::write_private_atomic;

/// A signed-in identity-provider session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account: AccountId,
    pub signed_in_at: DateTime<Utc>,
}

impl Session {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            signed_in_at: Utc::now(),
        }
    }
}

/// Identity provider interface.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current session, or `None` when nobody is signed in.
    async fn get_session(&self) -> Result<Option<Session>>;

    /// End the current session. Signing out when nobody is signed in is not an error.
    async fn sign_out(&self) -> Result<()>;
}

/// Identity provider backed by a JSON session file.
///
/// Stands in for the external provider: `sign_in` plays the role of the
/// completed handshake.
pub struct FileIdentityProvider {
    path: PathBuf,
}

impl FileIdentityProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a completed sign-in for `account`, replacing any previous session.
    pub fn sign_in(&self, account: AccountId) -> Result<Session> {
        let session = Session::new(account);
        let json = serde_json::to_vec_pretty(&session)?;
        write_private_atomic(&self.path, &json)
            .map_err(|e| LoonaError::Identity(format!("Failed to write session: {}", e)))?;
        tracing::info!(account = %session.account.namespace(), "signed in");
        Ok(session)
    }
}

#[async_trait]
impl IdentityProvider for FileIdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>> {
        let contents = match std::fs::read(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(LoonaError::Identity(format!(
                    "Failed to read session {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };
        match serde_json::from_slice::<Session>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                // A corrupt session file is treated as signed out.
                tracing::warn!(error = %err, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(LoonaError::Identity(format!(
                "Failed to remove session {}: {}",
                self.path.display(),
                err
            ))),
        }
    }
}
