use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use loona_core::VERSION;

/// Loona - a personal journal behind a per-account passphrase
#[derive(Parser)]
#[command(name = "loona")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the journal database
    #[arg(long, global = true, env = "LOONA_DB")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging to stderr (overridden by LOONA_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Database path to record in the config
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Remember unlocks across restarts on this device
    #[arg(long)]
    pub remember_unlock: bool,

    /// Seconds a remembered unlock stays valid (0 = until logout)
    #[arg(long)]
    pub unlock_ttl_seconds: Option<u64>,

    /// Display timezone (IANA name, e.g. Europe/Paris)
    #[arg(long)]
    pub timezone: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Entry title
    #[arg(long)]
    pub title: Option<String>,

    /// Entry body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Set custom date/time (ISO-8601 or YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `edit` command
#[derive(Args)]
pub struct EditArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New body (overrides stdin/editor)
    #[arg(long)]
    pub body: Option<String>,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `show` command
#[derive(Args)]
pub struct ShowArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

/// Arguments for the `delete` command
#[derive(Args)]
pub struct DeleteArgs {
    /// Entry ID (full UUID or prefix)
    #[arg(value_name = "ID")]
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_input: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a config file with defaults
    Init(InitArgs),

    /// Sign in with the identity provider
    Login {
        /// Account email
        #[arg(value_name = "EMAIL")]
        email: String,
    },

    /// Sign out and forget cached unlocks
    Logout,

    /// Show sign-in and lock state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set up or enter the journal passphrase
    Unlock {
        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Request a passphrase reset notification
    Reset,

    /// Change the journal passphrase
    Passwd {
        /// Disable interactive prompts
        #[arg(long)]
        no_input: bool,
    },

    /// Add a journal entry
    Add(AddArgs),

    /// List journal entries, newest first
    List(ListArgs),

    /// Show a journal entry
    Show(ShowArgs),

    /// Edit a journal entry
    Edit(EditArgs),

    /// Delete a journal entry
    Delete(DeleteArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}
