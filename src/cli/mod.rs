//! CLI module — Clap argument parser, output helpers, and command implementations.
//!
//! Commands only collect input and print results.  All encryption and
//! file access goes through `vault::Store` and `vault::Vault`.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::{Store, Vault};

/// Environment variable consulted before prompting for a master password.
pub const PASSWORD_ENV: &str = "VAULTSAFE_PASSWORD";

/// VaultSafe CLI: local, offline, multi-user password manager.
#[derive(Parser)]
#[command(
    name = "vaultsafe",
    about = "Local, offline, multi-user password manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Registry file (default: vault_file from vaultsafe.toml, or vault.json)
    #[arg(long, global = true)]
    pub vault: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// List registered users
    Users,

    /// Register a new user with an empty vault
    CreateUser {
        /// Name of the new user
        user: String,
    },

    /// List the sites stored in a user's vault
    Sites {
        /// Vault owner
        user: String,
    },

    /// List the logins stored for a site
    List {
        /// Vault owner
        user: String,
        /// Website identifier (e.g. github.com)
        site: String,
    },

    /// Add a login (replaces an existing one with the same name)
    Add {
        /// Vault owner
        user: String,
        /// Website identifier (e.g. github.com)
        site: String,
        /// Login name at the site
        login: String,
        /// Login password (omit for interactive prompt)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Reveal a stored login
    Show {
        /// Vault owner
        user: String,
        /// Website identifier
        site: String,
        /// Login name at the site
        login: String,
        /// Copy the password to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// Change the name or password of a stored login
    Edit {
        /// Vault owner
        user: String,
        /// Website identifier
        site: String,
        /// Current login name
        login: String,
        /// New login name (default: unchanged)
        #[arg(long)]
        new_login: Option<String>,
        /// New password (omit for interactive prompt; empty keeps the old one)
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Delete a stored login
    Delete {
        /// Vault owner
        user: String,
        /// Website identifier
        site: String,
        /// Login name at the site
        login: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from the working directory and build the store.
pub fn open_store(cli: &Cli) -> Result<(Store, Settings)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    let path = match &cli.vault {
        Some(path) => PathBuf::from(path),
        None => settings.vault_path(&cwd),
    };

    let store = Store::new(path).with_kdf_params(settings.kdf_params());
    Ok((store, settings))
}

/// Get a user's master password, trying in order:
/// 1. `VAULTSAFE_PASSWORD` env var (scripting)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(user: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(Zeroizing::new(pw));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Master password for {user}"))
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects `VAULTSAFE_PASSWORD` for scripted usage.
pub fn prompt_new_password(user: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(Zeroizing::new(pw));
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Choose master password for {user}"))
        .with_confirmation(
            "Confirm master password",
            "Passwords do not match, try again",
        )
        .allow_empty_password(true)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for the password of a website login (hidden input).
pub fn prompt_login_password(prompt: &str, allow_empty: bool) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(allow_empty)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for the master password and unlock `user`'s vault.
///
/// Returns the password too so the caller can save the vault afterwards.
pub fn unlock(store: &Store, user: &str) -> Result<(Vault, Zeroizing<String>)> {
    if !store.list_users().iter().any(|u| u == user) {
        return Err(VaultError::UserNotFound(user.to_string()));
    }

    let password = prompt_password(user)?;
    let vault = store.unlock_vault(user, password.as_bytes())?;
    Ok((vault, password))
}

/// Trim surrounding whitespace from a site or login typed by the user.
pub fn clean_input(value: &str) -> &str {
    value.trim()
}
