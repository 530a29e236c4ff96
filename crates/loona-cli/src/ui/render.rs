//! Rendering primitives for CLI output.

use comfy_table::{Attribute, Cell, ContentArrangement, Table as ComfyTable};

use super::context::UiContext;
use super::theme::{bold, dim, Badge};

/// Render a badge with optional message.
pub fn badge(ctx: &UiContext, kind: Badge, message: &str) -> String {
    let painted = kind.paint(ctx.color);
    if message.is_empty() {
        painted
    } else {
        format!("{} {}", painted, message)
    }
}

/// Render a key-value pair.
///
/// Pretty mode: "Key: value" with dim key
/// Plain mode: "key=value"
pub fn kv(ctx: &UiContext, key: &str, value: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", dim(&format!("{}:", key), ctx.color), value)
    } else {
        format!("{}={}", key.to_lowercase().replace(' ', "_"), value)
    }
}

/// Render a hint line.
pub fn hint(ctx: &UiContext, text: &str) -> String {
    if ctx.mode.is_pretty() {
        format!("{} {}", dim("Hint:", ctx.color), text)
    } else {
        format!("hint={}", text)
    }
}

/// Render a title line.
pub fn title(ctx: &UiContext, text: &str) -> String {
    bold(text, ctx.color)
}

/// Render rows under a header without borders.
///
/// Pretty mode: aligned columns with a dim header
/// Plain mode: tab-separated values, no header
pub fn simple_table(ctx: &UiContext, headers: &[&str], rows: &[Vec<String>]) -> String {
    if !ctx.mode.is_pretty() {
        return rows
            .iter()
            .map(|row| row.join("\t"))
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut table = ComfyTable::new();
    table.load_preset(comfy_table::presets::NOTHING);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|header| {
            let mut cell = Cell::new(header);
            if ctx.color {
                cell = cell.add_attribute(Attribute::Dim);
            }
            cell
        })
        .collect();
    table.set_header(header_cells);

    for i in 0..headers.len() {
        if let Some(column) = table.column_mut(i) {
            column.set_padding((0, 2));
        }
    }

    for row in rows {
        table.add_row(row);
    }

    table.to_string()
}

/// Truncate to `max` characters, appending an ellipsis when cut.
pub fn truncate(text: &str, max: usize) -> String {
    let single_line = text.lines().next().unwrap_or_default();
    if single_line.chars().count() <= max && single_line.len() == text.len() {
        return text.to_string();
    }
    let cut: String = single_line.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::mode::OutputMode;

    fn plain() -> UiContext {
        UiContext {
            is_tty: false,
            color: false,
            mode: OutputMode::Plain,
        }
    }

    #[test]
    fn test_kv_plain() {
        assert_eq!(kv(&plain(), "Signed in", "yes"), "signed_in=yes");
    }

    #[test]
    fn test_simple_table_plain_has_no_header() {
        let rows = vec![vec!["a".to_string(), "b".to_string()]];
        assert_eq!(simple_table(&plain(), &["ID", "TITLE"], &rows), "a\tb");
    }

    #[test]
    fn test_simple_table_pretty_has_header() {
        let ctx = UiContext {
            is_tty: true,
            color: false,
            mode: OutputMode::Pretty,
        };
        let rows = vec![vec!["0192".to_string(), "Monday".to_string()]];
        let rendered = simple_table(&ctx, &["ID", "TITLE"], &rows);
        assert!(rendered.contains("TITLE"));
        assert!(rendered.contains("Monday"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a long line of text", 10), "a long ...");
        assert_eq!(truncate("first\nsecond", 20), "first...");
    }
}
