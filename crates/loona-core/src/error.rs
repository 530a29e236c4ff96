//! Error types for Loona core operations.
//!
//! Every error here is recoverable: the gate surfaces it to the caller and
//! stays in (or returns to) a well-defined state. The CLI layer maps these
//! to user-friendly messages and exit codes.

use thiserror::Error;

/// Result type alias for Loona operations.
pub type Result<T> = std::result::Result<T, LoonaError>;

/// Core error type for Loona operations.
#[derive(Debug, Error)]
pub enum LoonaError {
    /// Bad user input (too-short passphrase, blank entry title, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Passphrase did not match the stored record
    #[error("Incorrect passphrase")]
    IncorrectPassphrase,

    /// A passphrase record already exists (setup raced with another session)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Credential or journal store could not be reached
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// Expected absence of a record or entry
    #[error("Not found: {0}")]
    NotFound(String),

    /// A passphrase submission is still in flight
    #[error("A passphrase submission is already in progress")]
    Busy,

    /// Journal access attempted without unlocking
    #[error("Journal is locked")]
    Locked,

    /// No identity-provider session
    #[error("Not signed in")]
    NotSignedIn,

    /// Operation not available in the current gate state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Hashing or digest parsing error
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// Local cache or session file error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Identity provider error
    #[error("Identity provider error: {0}")]
    Identity(String),

    /// I/O error
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl LoonaError {
    /// Whether resubmitting the same action may succeed without other changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LoonaError::StoreUnavailable(_) | LoonaError::Busy | LoonaError::Identity(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(LoonaError::StoreUnavailable("down".to_string()).is_retryable());
        assert!(LoonaError::Busy.is_retryable());
        assert!(!LoonaError::IncorrectPassphrase.is_retryable());
        assert!(!LoonaError::Validation("short".to_string()).is_retryable());
        assert!(!LoonaError::Conflict("exists".to_string()).is_retryable());
    }

    #[test]
    fn test_io_error_converts() {
        let err: LoonaError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
