//! Passphrase validation.

use crate::error::{LoonaError, Result};

/// Minimum passphrase length in characters.
pub const MIN_PASSPHRASE_LENGTH: usize = 4;

/// Validate a candidate passphrase before it is hashed.
///
/// Length is counted in characters, not bytes. Whitespace counts like any
/// other character.
///
/// # Examples
///
/// ```
/// use loona_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("abcd").is_ok());
/// assert!(validate_passphrase("abc").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    let length = passphrase.chars().count();
    if length < MIN_PASSPHRASE_LENGTH {
        return Err(LoonaError::Validation(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LENGTH, length
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passphrase_too_short() {
        let result = validate_passphrase("abc");
        assert!(matches!(result, Err(LoonaError::Validation(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("at least 4 characters"));
    }

    #[test]
    fn test_passphrase_exactly_min_length() {
        assert!(validate_passphrase("abcd").is_ok());
    }

    #[test]
    fn test_passphrase_empty() {
        assert!(validate_passphrase("").is_err());
        assert!(validate_passphrase("   ").is_err());
    }

    #[test]
    fn test_whitespace_counts_toward_length() {
        assert!(validate_passphrase("    ").is_ok());
        assert!(validate_passphrase("\n\t\n\t").is_ok());
        assert!(validate_passphrase(" ab ").is_ok());
    }

    #[test]
    fn test_length_counts_characters() {
        // Four characters, eight bytes.
        assert!(validate_passphrase("éèêë").is_ok());
        // Two characters, six bytes.
        assert!(validate_passphrase("日本").is_err());
    }
}
