//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (journal entry, passphrase record).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (wrong passphrase, too many attempts).
    pub const AUTH_FAILED: i32 = 5;

    /// Credential or journal store unreachable; retry later.
    pub const STORE_UNAVAILABLE: i32 = 6;

    /// No identity session; run `loona login`.
    pub const NOT_SIGNED_IN: i32 = 7;
}

/// Passphrase attempts allowed per interactive unlock.
pub const MAX_PASSPHRASE_ATTEMPTS: u32 = 3;

/// Default number of entries shown by `loona list`.
pub const DEFAULT_LIST_LIMIT: usize = 20;
