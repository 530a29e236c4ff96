//! Input and parsing helper functions for the CLI.

use std::io::{self, IsTerminal, Read};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDate, Utc};
use dialoguer::{Confirm, Input, Password};
use secrecy::SecretString;

pub const PASSPHRASE_ENV: &str = "LOONA_PASSPHRASE";
pub const NEW_PASSPHRASE_ENV: &str = "LOONA_NEW_PASSPHRASE";

/// Whether prompts may be shown.
pub fn is_interactive(no_input: bool) -> bool {
    !no_input && io::stdin().is_terminal()
}

fn env_secret(name: &str) -> Option<SecretString> {
    secret_from_env_value(std::env::var(name).ok())
}

/// Unset and empty values mean "not provided"; whitespace is kept verbatim.
fn secret_from_env_value(value: Option<String>) -> Option<SecretString> {
    value.filter(|value| !value.is_empty()).map(SecretString::from)
}

/// Passphrase from LOONA_PASSPHRASE, if set.
pub fn env_passphrase() -> Option<SecretString> {
    env_secret(PASSPHRASE_ENV)
}

/// Prompt for the journal passphrase.
pub fn prompt_passphrase(interactive: bool, prompt: &str) -> anyhow::Result<SecretString> {
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            PASSPHRASE_ENV
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Prompt for a new passphrase with confirmation, or read it from `env_name`.
pub fn prompt_new_passphrase(interactive: bool, env_name: &str) -> anyhow::Result<SecretString> {
    if let Some(value) = env_secret(env_name) {
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!(
            "No passphrase provided and no TTY available. Set {}.",
            env_name
        ));
    }
    Password::new()
        .with_prompt("New passphrase")
        .with_confirmation("Confirm passphrase", "Passphrases do not match")
        .interact()
        .map(SecretString::from)
        .map_err(|e| anyhow::anyhow!("Failed to read passphrase: {}", e))
}

/// Ask a yes/no question; `false` without a TTY.
pub fn confirm(interactive: bool, prompt: &str) -> anyhow::Result<bool> {
    if !interactive {
        return Ok(false);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read answer: {}", e))
}

/// Read a title from `--title` or an interactive prompt.
pub fn read_title(interactive: bool, title: Option<String>) -> anyhow::Result<String> {
    if let Some(value) = title {
        if value.trim().is_empty() {
            return Err(anyhow::anyhow!("--title cannot be empty"));
        }
        return Ok(value);
    }
    if !interactive {
        return Err(anyhow::anyhow!("--title is required without a TTY"));
    }
    Input::<String>::new()
        .with_prompt("Title")
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to read title: {}", e))
}

/// Parse a datetime string (ISO-8601 or YYYY-MM-DD).
pub fn parse_datetime(value: &str) -> anyhow::Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let naive = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid date value: {}", value))?;
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    Err(anyhow::anyhow!(
        "Invalid date/time (expected ISO-8601 or YYYY-MM-DD): {}",
        value
    ))
}

/// Read entry body from --body flag, stdin, or $EDITOR.
///
/// `initial` seeds the editor buffer when editing an existing entry.
pub fn read_entry_body(
    no_input: bool,
    body: Option<String>,
    editor_override: Option<&str>,
    initial: Option<&str>,
) -> anyhow::Result<String> {
    if let Some(value) = body {
        if value.trim().is_empty() {
            return Err(anyhow::anyhow!("--body cannot be empty"));
        }
        return Ok(value);
    }

    if !io::stdin().is_terminal() {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow::anyhow!("Failed to read stdin: {}", e))?;
        let trimmed = buffer.trim_end().to_string();
        if trimmed.is_empty() {
            return Err(anyhow::anyhow!("No input provided on stdin"));
        }
        return Ok(trimmed);
    }

    if no_input {
        return Err(anyhow::anyhow!("--no-input requires content from stdin"));
    }

    read_body_from_editor(editor_override, initial)
}

/// Open $EDITOR to compose entry body.
fn read_body_from_editor(editor_override: Option<&str>, initial: Option<&str>) -> anyhow::Result<String> {
    let editor = editor_override
        .map(|value| value.to_string())
        .or_else(|| std::env::var("EDITOR").ok())
        .ok_or_else(|| {
            anyhow::anyhow!("$EDITOR is not set; use --body or pipe content via stdin")
        })?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| anyhow::anyhow!("System time error: {}", e))?
        .as_nanos();
    let filename = format!("loona_entry_{}_{}.md", std::process::id(), nanos);
    let path = std::env::temp_dir().join(filename);

    loona_core::fs::write_private_atomic(&path, initial.unwrap_or_default().as_bytes())
        .map_err(|e| anyhow::anyhow!("Failed to create temp file: {}", e))?;

    let status = Command::new(editor)
        .arg(&path)
        .status()
        .map_err(|e| anyhow::anyhow!("Failed to launch editor: {}", e))?;
    if !status.success() {
        let _ = std::fs::remove_file(&path);
        return Err(anyhow::anyhow!("Editor exited with failure"));
    }

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read temp file: {}", e))?;
    let _ = std::fs::remove_file(&path);

    let trimmed = contents.trim_end().to_string();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("Entry body is empty"));
    }

    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_datetime_formats() {
        let parsed = parse_datetime("2024-03-01").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let parsed = parse_datetime("2024-03-01T10:30:00+02:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T08:30:00+00:00");

        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_env_passphrase_keeps_whitespace() {
        use secrecy::ExposeSecret;

        assert!(secret_from_env_value(None).is_none());
        assert!(secret_from_env_value(Some(String::new())).is_none());
        let secret = secret_from_env_value(Some("    ".to_string())).unwrap();
        assert_eq!(secret.expose_secret(), "    ");
    }

    #[test]
    fn test_body_flag_wins() {
        let body = read_entry_body(true, Some("hello".to_string()), None, None).unwrap();
        assert_eq!(body, "hello");
        assert!(read_entry_body(true, Some("  ".to_string()), None, None).is_err());
    }

    #[test]
    fn test_title_required_without_tty() {
        assert!(read_title(false, None).is_err());
        assert!(read_title(false, Some(" ".to_string())).is_err());
        assert_eq!(read_title(false, Some("Monday".to_string())).unwrap(), "Monday");
    }
}
