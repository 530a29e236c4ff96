//! Resolving the gate and unlocking it with retry logic.

use loona_core::{AuthGate, GateState, LoonaError};
use secrecy::SecretString;

use crate::constants::MAX_PASSPHRASE_ATTEMPTS;
use crate::errors::CliError;
use crate::helpers::{
    env_passphrase, is_interactive, prompt_new_passphrase, prompt_passphrase, PASSPHRASE_ENV,
};
use crate::ui::{badge, Badge, Spinner, UiContext};

use super::context::AppContext;

/// Page entry: rebuild the gate state without prompting.
pub async fn resolve_gate(ctx: &AppContext<'_>, gate: &AuthGate) -> anyhow::Result<GateState> {
    let ui = ctx.ui(false);
    let spinner = Spinner::start(&ui, "Checking passphrase record");
    let state = gate.resolve().await;
    spinner.finish();
    Ok(state?)
}

/// Resolve the gate and prompt until it is unlocked.
///
/// Passphrases come from LOONA_PASSPHRASE (one attempt) or an interactive
/// prompt (up to three attempts).
pub async fn unlock(ctx: &AppContext<'_>, gate: &AuthGate, no_input: bool) -> anyhow::Result<()> {
    let ui = ctx.ui(false);
    let interactive = is_interactive(no_input);

    match resolve_gate(ctx, gate).await? {
        GateState::Unlocked { .. } => Ok(()),
        GateState::LoggedOut => Err(CliError::NotSignedIn.into()),
        GateState::NeedsPassphraseSetup { account } => {
            if !ctx.quiet() && interactive {
                eprintln!(
                    "{}",
                    badge(&ui, Badge::Info, &format!("No passphrase is set for {} yet. Choose one.", account))
                );
            }
            setup_with_retry(ctx, gate, &ui, interactive).await
        }
        GateState::NeedsPassphraseEntry { .. } => enter_with_retry(gate, &ui, interactive).await,
        GateState::Unresolved => Err(anyhow::anyhow!("Passphrase gate did not resolve")),
    }
}

async fn setup_with_retry(
    ctx: &AppContext<'_>,
    gate: &AuthGate,
    ui: &UiContext,
    interactive: bool,
) -> anyhow::Result<()> {
    let max_attempts = if interactive { MAX_PASSPHRASE_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let candidate = prompt_new_passphrase(interactive, PASSPHRASE_ENV)?;
        let spinner = Spinner::start(ui, "Saving passphrase");
        let result = gate.set_passphrase(&candidate).await;
        spinner.finish();

        match result {
            Ok(_) => {
                if !ctx.quiet() {
                    eprintln!("Passphrase set. Journal unlocked.");
                }
                return Ok(());
            }
            Err(LoonaError::Conflict(_)) => {
                if !ctx.quiet() {
                    eprintln!("A passphrase was already set from another session. Enter it to continue.");
                }
                return enter_with_retry(gate, ui, interactive).await;
            }
            Err(LoonaError::Validation(message)) if attempts < max_attempts => {
                eprintln!("{}", message);
                continue;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn enter_with_retry(gate: &AuthGate, ui: &UiContext, interactive: bool) -> anyhow::Result<()> {
    if let Some(candidate) = env_passphrase() {
        return enter_once(gate, ui, &candidate).await.map_err(|err| match err {
            LoonaError::IncorrectPassphrase => CliError::auth_failed("Incorrect passphrase.").into(),
            other => anyhow::Error::new(other),
        });
    }

    let max_attempts = if interactive { MAX_PASSPHRASE_ATTEMPTS } else { 1 };
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let candidate = prompt_passphrase(interactive, "Passphrase")?;
        match enter_once(gate, ui, &candidate).await {
            Ok(()) => return Ok(()),
            Err(LoonaError::IncorrectPassphrase) => {
                let remaining = max_attempts.saturating_sub(attempts);
                if remaining == 0 {
                    return Err(CliError::auth_failed_with_hint(
                        "Too many failed passphrase attempts.",
                        "Hint: Run `loona reset` to request a passphrase reset.",
                    )
                    .into());
                }
                let message = format!(
                    "Incorrect passphrase. {} attempt{} remaining.",
                    remaining,
                    if remaining == 1 { "" } else { "s" }
                );
                eprintln!("{}", badge(ui, Badge::Warn, &message));
            }
            Err(err) => return Err(err.into()),
        }
    }
}

async fn enter_once(gate: &AuthGate, ui: &UiContext, candidate: &SecretString) -> Result<(), LoonaError> {
    let spinner = Spinner::start(ui, "Verifying passphrase");
    let result = gate.enter_passphrase(candidate).await;
    spinner.finish();
    result.map(|_| ())
}
