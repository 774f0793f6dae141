//! `vaultsafe add` — store a login for a site.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{clean_input, open_store, prompt_login_password, unlock, Cli};
use crate::errors::Result;

/// Execute the `add` command.
pub fn execute(cli: &Cli, user: &str, site: &str, login: &str, password: Option<&str>) -> Result<()> {
    let user = clean_input(user);
    let site = clean_input(site);
    let login = clean_input(login);
    let (store, _) = open_store(cli)?;
    let (mut vault, master) = unlock(&store, user)?;

    let login_password = match password {
        Some(p) => {
            output::warning("Password provided on command line — it may appear in shell history.");
            Zeroizing::new(p.to_string())
        }
        None => prompt_login_password(&format!("Password for {login} at {site}"), false)?,
    };

    let existed = vault
        .list_identities_at(site)
        .iter()
        .any(|id| id.username == login);

    vault.add_entry(site, login, &login_password)?;
    store.save_vault(user, master.as_bytes(), &vault)?;

    if existed {
        output::success(&format!("Updated login '{login}' at {site}"));
    } else {
        output::success(&format!(
            "Added login '{login}' at {site} ({} at this site)",
            vault.records_at(site).len()
        ));
    }

    Ok(())
}
