//! `vaultsafe list` — list the logins stored for one site.

use crate::cli::output;
use crate::cli::{clean_input, open_store, unlock, Cli};
use crate::errors::Result;
use crate::vault::PLACEHOLDER;

/// Execute the `list` command.
pub fn execute(cli: &Cli, user: &str, site: &str) -> Result<()> {
    let user = clean_input(user);
    let site = clean_input(site);
    let (store, _) = open_store(cli)?;
    let (vault, _password) = unlock(&store, user)?;

    let identities = vault.list_identities_at(site);
    if identities.is_empty() {
        output::info(&format!("No logins stored for {site}."));
        return Ok(());
    }

    output::print_identities_table(&identities);

    if identities.iter().any(|id| id.username == PLACEHOLDER) {
        output::warning(&format!(
            "Some entries could not be decrypted and are shown as {PLACEHOLDER}."
        ));
    }

    Ok(())
}
