//! Loona CLI - a personal journal gated behind a per-account passphrase
//!
//! Each invocation rebuilds the passphrase gate from the signed-in session,
//! the credential store and the unlock caches, then runs one command.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod output;
mod ui;

use clap::Parser;
use loona_core::VERSION;
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{
    handle_add, handle_completions, handle_delete, handle_edit, handle_init, handle_list,
    handle_login, handle_logout, handle_passwd, handle_reset, handle_show, handle_status,
    handle_unlock,
};
use crate::errors::{exit_code_for, message_for};
use crate::ui::{badge, Badge};

const LOG_ENV: &str = "LOONA_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let ctx = AppContext::new(&cli);

    if let Err(e) = run(&ctx).await {
        tracing::debug!(error = ?e, "command failed");
        let ui = ctx.ui(false);
        eprintln!("{}", badge(&ui, Badge::Err, &message_for(&e)));
        std::process::exit(exit_code_for(&e));
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    match &ctx.cli().command {
        Some(Commands::Init(args)) => handle_init(ctx, args)?,
        Some(Commands::Login { email }) => handle_login(ctx, email).await?,
        Some(Commands::Logout) => handle_logout(ctx).await?,
        Some(Commands::Status { json }) => handle_status(ctx, *json).await?,
        Some(Commands::Unlock { no_input }) => handle_unlock(ctx, *no_input).await?,
        Some(Commands::Reset) => handle_reset(ctx).await?,
        Some(Commands::Passwd { no_input }) => handle_passwd(ctx, *no_input).await?,
        Some(Commands::Add(args)) => handle_add(ctx, args).await?,
        Some(Commands::List(args)) => handle_list(ctx, args).await?,
        Some(Commands::Show(args)) => handle_show(ctx, args).await?,
        Some(Commands::Edit(args)) => handle_edit(ctx, args).await?,
        Some(Commands::Delete(args)) => handle_delete(ctx, args).await?,
        Some(Commands::Completions { shell }) => handle_completions(*shell)?,
        None => {
            println!("Loona v{}", VERSION);
            println!("\nQuickstart:");
            println!("  loona init");
            println!("  loona login you@example.com");
            println!("  loona unlock");
            println!("  loona add --title \"Monday\" --body \"Hello\"");
            println!("  loona list");
            println!("\nRun `loona --help` for full usage.");
        }
    }

    Ok(())
}
