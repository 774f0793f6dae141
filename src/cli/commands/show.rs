//! `vaultsafe show` — reveal a stored login, or copy its password.

use std::thread;
use std::time::Duration;

use crate::cli::output;
use crate::cli::{clean_input, open_store, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `show` command.
pub fn execute(cli: &Cli, user: &str, site: &str, login: &str, copy: bool) -> Result<()> {
    let user = clean_input(user);
    let site = clean_input(site);
    let login = clean_input(login);
    let (store, settings) = open_store(cli)?;
    let (vault, _password) = unlock(&store, user)?;

    let credential = vault.reveal_entry(site, login)?;

    if !copy {
        println!("Login:    {}", credential.username);
        println!("Password: {}", credential.password);
        return Ok(());
    }

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| VaultError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(credential.password.clone())
        .map_err(|e| VaultError::CommandFailed(format!("clipboard write failed: {e}")))?;

    let secs = settings.clipboard_clear_secs;
    output::success(&format!(
        "Password for '{login}' copied. Clearing clipboard in {secs} seconds..."
    ));

    // Stay alive until the clipboard is cleared.
    thread::sleep(Duration::from_secs(secs));
    clipboard
        .clear()
        .map_err(|e| VaultError::CommandFailed(format!("clipboard clear failed: {e}")))?;
    output::info("Clipboard cleared.");

    Ok(())
}
