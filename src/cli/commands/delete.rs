//! `vaultsafe delete` — remove a stored login.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{clean_input, open_store, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, user: &str, site: &str, login: &str, force: bool) -> Result<()> {
    let user = clean_input(user);
    let site = clean_input(site);
    let login = clean_input(login);
    let (store, _) = open_store(cli)?;
    let (mut vault, master) = unlock(&store, user)?;

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete login '{login}' at {site}?"))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    vault.delete_entry(site, login)?;
    store.save_vault(user, master.as_bytes(), &vault)?;

    output::success(&format!("Deleted login '{login}' at {site}"));
    if !vault.list_sites().contains(&site) {
        output::tip(&format!("{site} has no logins left and was removed."));
    }

    Ok(())
}
