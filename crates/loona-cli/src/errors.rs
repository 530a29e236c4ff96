//! CLI error types for structured error handling.
//!
//! Typed errors map to specific exit codes. Core errors are translated at
//! the top level so handlers can simply propagate with `?`.

use std::fmt;

use loona_core::LoonaError;

use crate::constants::exit_codes;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (entry, passphrase record, ...)
    NotFound { message: String, hint: String },

    /// Authentication failed (wrong passphrase, too many attempts)
    AuthFailed {
        message: String,
        hint: Option<String>,
    },

    /// Invalid user input
    InvalidInput(String),

    /// Credential or journal store unreachable
    StoreUnavailable(String),

    /// No identity session
    NotSignedIn,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::AuthFailed { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) => write!(f, "{}", message),
            CliError::StoreUnavailable(reason) => write!(
                f,
                "The credential store is unavailable: {}\nHint: Nothing was changed. Try again later.",
                reason
            ),
            CliError::NotSignedIn => {
                write!(f, "Not signed in.\nHint: Run `loona login <email>` first.")
            }
        }
    }
}

impl std::error::Error for CliError {}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an AuthFailed error with message and optional hint.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: None,
        }
    }

    /// Create an AuthFailed error with message and hint.
    pub fn auth_failed_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::AuthFailed {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Translate a core error, if it has a dedicated exit code.
    pub fn from_core(err: &LoonaError) -> Option<Self> {
        let mapped = match err {
            LoonaError::Validation(message) => CliError::invalid_input(message.clone()),
            LoonaError::IncorrectPassphrase => CliError::auth_failed("Incorrect passphrase."),
            LoonaError::Locked => CliError::auth_failed_with_hint(
                "Journal is locked.",
                "Hint: Run `loona unlock`, or set LOONA_PASSPHRASE.",
            ),
            LoonaError::NotFound(message) => {
                CliError::not_found(format!("Not found: {}", message), "Hint: Run `loona list`.")
            }
            LoonaError::StoreUnavailable(reason) => CliError::StoreUnavailable(reason.clone()),
            LoonaError::NotSignedIn => CliError::NotSignedIn,
            _ => return None,
        };
        Some(mapped)
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::AuthFailed { .. } => exit_codes::AUTH_FAILED,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::StoreUnavailable(_) => exit_codes::STORE_UNAVAILABLE,
            CliError::NotSignedIn => exit_codes::NOT_SIGNED_IN,
        }
    }
}

/// Exit code for an error bubbling out of a command handler.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    if let Some(cli) = err.downcast_ref::<CliError>() {
        return cli.exit_code();
    }
    if let Some(core) = err.downcast_ref::<LoonaError>() {
        if let Some(cli) = CliError::from_core(core) {
            return cli.exit_code();
        }
    }
    1
}

/// Message for an error bubbling out of a command handler.
pub fn message_for(err: &anyhow::Error) -> String {
    if let Some(core) = err.downcast_ref::<LoonaError>() {
        if let Some(cli) = CliError::from_core(core) {
            return cli.to_string();
        }
    }
    format!("{:#}", err)
}
