//! Account identifiers.
//!
//! The identifier comes from the identity provider (a verified email in
//! practice) and is the join key for passphrase records, cache entries and
//! journal entries.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LoonaError, Result};

const MAX_ACCOUNT_BYTES: usize = 320;

/// Normalized, stable account identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    /// Normalize and validate an identifier.
    ///
    /// Surrounding whitespace is trimmed and ASCII letters are lowercased so
    /// `A@X.com` and `a@x.com ` name the same account.
    pub fn parse(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(LoonaError::Validation(
                "Account identifier cannot be empty".to_string(),
            ));
        }
        if normalized.len() > MAX_ACCOUNT_BYTES {
            return Err(LoonaError::Validation(format!(
                "Account identifier too long (max {} bytes)",
                MAX_ACCOUNT_BYTES
            )));
        }
        if normalized.chars().any(|c| c.is_control()) {
            return Err(LoonaError::Validation(
                "Account identifier contains control characters".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, stable namespace derived from the identifier.
    ///
    /// Used to key local cache entries and as the account label in logs.
    pub fn namespace(&self) -> String {
        let hash = blake3::hash(self.0.as_bytes());
        hash.to_hex()[..16].to_string()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountId {
    type Error = LoonaError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<AccountId> for String {
    fn from(value: AccountId) -> Self {
        value.0
    }
}
