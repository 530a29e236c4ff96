use loona_core::journal::{EntryPatch, NewJournalEntry};

use crate::app::{unlock, AppContext};
use crate::cli::{AddArgs, DeleteArgs, EditArgs, ListArgs, ShowArgs};
use crate::constants::DEFAULT_LIST_LIMIT;
use crate::errors::CliError;
use crate::helpers::{confirm, is_interactive, parse_datetime, read_entry_body, read_title};
use crate::output::{entries_json, entries_table, entry_json, print_entry, short_id};
use crate::ui::{badge, hint, Badge};

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, args.no_input).await?;
    let store = ctx.journal_store()?;
    let journal = gate.journal(&store)?;

    let title = read_title(is_interactive(args.no_input), args.title.clone())?;
    let body = read_entry_body(args.no_input, args.body.clone(), ctx.editor()?, None)?;
    let mut entry = NewJournalEntry::new(title, body);
    if let Some(value) = args.date.as_deref() {
        entry = entry.with_created_at(parse_datetime(value)?);
    }

    let created = journal.add(entry).await?;
    if !ctx.quiet() {
        println!("Added entry {}", created.id);
    }
    Ok(())
}

pub async fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, args.no_input).await?;
    let store = ctx.journal_store()?;
    let journal = gate.journal(&store)?;

    let mut entries = journal.entries().await?;
    entries.truncate(args.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    let ui = ctx.ui(args.json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&entries_json(&entries))?);
        return Ok(());
    }

    if entries.is_empty() {
        if !ctx.quiet() {
            println!("No entries yet.");
            println!("{}", hint(&ui, "loona add"));
        }
        return Ok(());
    }
    println!("{}", entries_table(&ui, &entries, ctx.timezone()?));
    Ok(())
}

pub async fn handle_show(ctx: &AppContext<'_>, args: &ShowArgs) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, args.no_input).await?;
    let store = ctx.journal_store()?;
    let journal = gate.journal(&store)?;

    let entry = journal.find(&args.id).await?;
    let ui = ctx.ui(args.json);
    if ui.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&entry_json(&entry))?);
        return Ok(());
    }
    print_entry(&ui, &entry, ctx.timezone()?, ctx.quiet());
    Ok(())
}

pub async fn handle_edit(ctx: &AppContext<'_>, args: &EditArgs) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, args.no_input).await?;
    let store = ctx.journal_store()?;
    let journal = gate.journal(&store)?;

    let entry = journal.find(&args.id).await?;
    let mut patch = EntryPatch::new();
    if let Some(title) = args.title.clone() {
        patch = patch.title(title);
    }
    if args.body.is_some() || args.title.is_none() {
        let body = read_entry_body(
            args.no_input,
            args.body.clone(),
            ctx.editor()?,
            Some(&entry.body),
        )?;
        patch = patch.body(body);
    }

    journal.edit(&entry.id, patch).await?;
    if !ctx.quiet() {
        println!("Updated entry {}", entry.id);
    }
    Ok(())
}

pub async fn handle_delete(ctx: &AppContext<'_>, args: &DeleteArgs) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, args.no_input).await?;
    let store = ctx.journal_store()?;
    let journal = gate.journal(&store)?;

    let entry = journal.find(&args.id).await?;
    if !args.yes {
        let interactive = is_interactive(args.no_input);
        if !interactive {
            return Err(CliError::invalid_input("Refusing to delete without --yes").into());
        }
        let prompt = format!("Delete \"{}\" ({})?", entry.title, short_id(&entry));
        if !confirm(interactive, &prompt)? {
            return Ok(());
        }
    }

    journal.remove(&entry.id).await?;
    if !ctx.quiet() {
        println!(
            "{}",
            badge(&ctx.ui(false), Badge::Ok, &format!("Deleted entry {}", entry.id))
        );
    }
    Ok(())
}
