use loona_core::{AccountId, GateState, IdentityProvider, LoonaError};

use crate::app::{resolve_gate, unlock, AppContext};
use crate::errors::CliError;
use crate::helpers::{
    env_passphrase, is_interactive, prompt_new_passphrase, prompt_passphrase, NEW_PASSPHRASE_ENV,
};
use crate::ui::{badge, hint, kv, Badge, Spinner};

/// Complete the identity-provider handshake for `email`.
///
/// An existing session is logged out first so its cached unlocks are purged.
pub async fn handle_login(ctx: &AppContext<'_>, email: &str) -> anyhow::Result<()> {
    let account = AccountId::parse(email)?;
    let identity = ctx.identity()?;
    if let Some(previous) = identity.get_session().await? {
        tracing::debug!(account = %previous.account.namespace(), "replacing existing session");
        ctx.gate()?.logout().await?;
    }
    let session = identity.sign_in(account)?;

    if !ctx.quiet() {
        let ui = ctx.ui(false);
        println!(
            "{}",
            badge(&ui, Badge::Ok, &format!("Signed in as {}", session.account))
        );
        println!("{}", hint(&ui, "loona unlock"));
    }
    Ok(())
}

pub async fn handle_logout(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    gate.logout().await?;

    if !ctx.quiet() {
        println!("{}", badge(&ctx.ui(false), Badge::Ok, "Signed out"));
    }
    Ok(())
}

pub async fn handle_status(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    let state = resolve_gate(ctx, &gate).await?;
    let flags = state.session_state();
    let ui = ctx.ui(json);

    if ui.mode.is_json() {
        let value = serde_json::json!({
            "signed_in": flags.authenticated,
            "account": state.account().map(|account| account.as_str()),
            "state": state.name(),
            "unlocked": flags.unlocked,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let account = state
        .account()
        .map(|account| account.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("{}", kv(&ui, "Account", &account));
    println!("{}", kv(&ui, "State", state.name()));
    if !ctx.quiet() {
        let next = match state {
            GateState::LoggedOut | GateState::Unresolved => Some("loona login <email>"),
            GateState::NeedsPassphraseSetup { .. } | GateState::NeedsPassphraseEntry { .. } => {
                Some("loona unlock")
            }
            GateState::Unlocked { .. } => None,
        };
        if let Some(next) = next {
            println!("{}", hint(&ui, next));
        }
    }
    Ok(())
}

pub async fn handle_unlock(ctx: &AppContext<'_>, no_input: bool) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    unlock(ctx, &gate, no_input).await?;

    if !ctx.quiet() {
        if let Some(account) = gate.state().account() {
            println!(
                "{}",
                badge(&ctx.ui(false), Badge::Ok, &format!("Unlocked journal for {}", account))
            );
        }
    }
    Ok(())
}

/// Send a reset notification for the signed-in account.
pub async fn handle_reset(ctx: &AppContext<'_>) -> anyhow::Result<()> {
    let gate = ctx.gate()?;
    let account = match resolve_gate(ctx, &gate).await? {
        GateState::NeedsPassphraseEntry { account } => account,
        GateState::Unlocked { .. } => {
            return Err(CliError::invalid_input(
                "Journal is unlocked.\nHint: Use `loona passwd` to change the passphrase.",
            )
            .into())
        }
        GateState::NeedsPassphraseSetup { .. } => {
            return Err(CliError::not_found(
                "No passphrase is set for this account.",
                "Hint: Run `loona unlock` to choose one.",
            )
            .into())
        }
        GateState::LoggedOut | GateState::Unresolved => return Err(CliError::NotSignedIn.into()),
    };

    gate.request_reset().await?;
    if !ctx.quiet() {
        println!(
            "{}",
            badge(
                &ctx.ui(false),
                Badge::Ok,
                &format!("Reset instructions sent to {}", account)
            )
        );
    }
    Ok(())
}

/// Change the passphrase: verify the current one, then store the new one.
pub async fn handle_passwd(ctx: &AppContext<'_>, no_input: bool) -> anyhow::Result<()> {
    let interactive = is_interactive(no_input);
    let gate = ctx.gate()?;
    unlock(ctx, &gate, no_input).await?;

    let current = match env_passphrase() {
        Some(value) => value,
        None => prompt_passphrase(interactive, "Current passphrase")?,
    };
    let new = prompt_new_passphrase(interactive, NEW_PASSPHRASE_ENV)?;

    let ui = ctx.ui(false);
    let spinner = Spinner::start(&ui, "Updating passphrase");
    let result = gate.change_passphrase(&current, &new).await;
    spinner.finish();
    match result {
        Ok(()) => {}
        Err(LoonaError::IncorrectPassphrase) => {
            return Err(CliError::auth_failed("Current passphrase is incorrect.").into())
        }
        Err(err) => return Err(err.into()),
    }

    if !ctx.quiet() {
        println!("{}", badge(&ui, Badge::Ok, "Passphrase changed"));
    }
    Ok(())
}
