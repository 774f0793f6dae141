//! `vaultsafe sites` — list the sites in a user's vault.

use crate::cli::output;
use crate::cli::{clean_input, open_store, unlock, Cli};
use crate::errors::Result;

/// Execute the `sites` command.
pub fn execute(cli: &Cli, user: &str) -> Result<()> {
    let user = clean_input(user);
    let (store, _) = open_store(cli)?;
    let (vault, _password) = unlock(&store, user)?;

    output::info(&format!(
        "{user} — {} site(s), {} login(s)",
        vault.list_sites().len(),
        vault.entry_count()
    ));
    output::print_sites_table(&vault);

    Ok(())
}
