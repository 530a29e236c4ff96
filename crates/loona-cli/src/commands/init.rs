use loona_core::credentials::SqliteCredentialStore;
use loona_core::journal::SqliteJournalStore;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, parse_timezone, write_config, LoonaConfig, DEFAULT_UNLOCK_TTL_SECONDS};
use crate::errors::CliError;
use crate::ui::{badge, hint, kv, Badge};

/// Write a config file and create the store schema.
pub fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path()?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Use --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let store_path = match args.path.as_deref().or(ctx.cli().db.as_deref()) {
        Some(path) => std::path::PathBuf::from(path),
        None => default_store_path()?,
    };
    let timezone = args
        .timezone
        .as_deref()
        .map(|value| parse_timezone(value).map(|tz| tz.to_string()))
        .transpose()?;

    let config = LoonaConfig::new(
        store_path.clone(),
        args.remember_unlock,
        args.unlock_ttl_seconds.unwrap_or(DEFAULT_UNLOCK_TTL_SECONDS),
        timezone,
    );
    config.validate()?;

    // Both tables live in one database file; opening creates the schema.
    SqliteCredentialStore::open(&store_path)?;
    SqliteJournalStore::open(&store_path)?;
    write_config(&config_path, &config)?;
    tracing::info!(path = %config_path.display(), "wrote config");

    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!("{}", badge(&ui, Badge::Ok, "Initialized Loona"));
        println!("{}", kv(&ui, "Config", &config_path.display().to_string()));
        println!("{}", kv(&ui, "Store", &store_path.display().to_string()));
        println!("{}", hint(&ui, "loona login <email>"));
    }
    Ok(())
}
