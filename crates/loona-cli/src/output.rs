//! Output formatting helpers for the CLI.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use loona_core::JournalEntry;

use crate::ui::{kv, simple_table, title, truncate, UiContext};

const TABLE_SUMMARY_MAX: usize = 60;
const SHORT_ID_LEN: usize = 8;

/// Format a timestamp in the configured timezone (UTC when unset).
pub fn format_timestamp(value: DateTime<Utc>, timezone: Option<Tz>) -> String {
    match timezone {
        Some(tz) => value.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string(),
        None => value.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}

pub fn short_id(entry: &JournalEntry) -> String {
    entry.id.to_string().chars().take(SHORT_ID_LEN).collect()
}

/// Convert an entry to JSON for output.
pub fn entry_json(entry: &JournalEntry) -> serde_json::Value {
    serde_json::json!({
        "id": entry.id,
        "title": entry.title,
        "body": entry.body,
        "created_at": entry.created_at,
        "updated_at": entry.updated_at,
    })
}

/// Convert multiple entries to a JSON array for output.
pub fn entries_json(entries: &[JournalEntry]) -> Vec<serde_json::Value> {
    entries.iter().map(entry_json).collect()
}

/// Render entries as a table, newest first.
pub fn entries_table(ctx: &UiContext, entries: &[JournalEntry], timezone: Option<Tz>) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                short_id(entry),
                format_timestamp(entry.created_at, timezone),
                truncate(&entry.title, TABLE_SUMMARY_MAX / 2),
                truncate(&entry.body, TABLE_SUMMARY_MAX),
            ]
        })
        .collect();
    simple_table(ctx, &["ID", "DATE", "TITLE", "ENTRY"], &rows)
}

/// Print a single entry in human-readable format.
pub fn print_entry(ctx: &UiContext, entry: &JournalEntry, timezone: Option<Tz>, quiet: bool) {
    if !quiet {
        println!("{}", title(ctx, &entry.title));
        println!("{}", kv(ctx, "ID", &entry.id.to_string()));
        println!(
            "{}",
            kv(ctx, "Created", &format_timestamp(entry.created_at, timezone))
        );
        if let Some(updated_at) = entry.updated_at {
            println!("{}", kv(ctx, "Updated", &format_timestamp(updated_at, timezone)));
        }
        println!();
    }
    println!("{}", entry.body);
}
