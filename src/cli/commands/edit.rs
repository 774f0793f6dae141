//! `vaultsafe edit` — change the login name or password of a stored entry.

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{clean_input, open_store, prompt_login_password, unlock, Cli};
use crate::errors::Result;

/// Execute the `edit` command.
pub fn execute(
    cli: &Cli,
    user: &str,
    site: &str,
    login: &str,
    new_login: Option<&str>,
    new_password: Option<&str>,
) -> Result<()> {
    let user = clean_input(user);
    let site = clean_input(site);
    let login = clean_input(login);
    let (store, _) = open_store(cli)?;
    let (mut vault, master) = unlock(&store, user)?;

    // Fails early if the entry does not exist.
    let current = vault.reveal_entry(site, login)?;

    let target_login = new_login.map(clean_input).unwrap_or(login);
    let mut password = match new_password {
        Some(p) => Zeroizing::new(p.to_string()),
        None => prompt_login_password("New password (leave empty to keep current)", true)?,
    };
    if password.is_empty() {
        password = Zeroizing::new(current.password.clone());
    }

    vault.update_entry(site, login, target_login, &password)?;
    store.save_vault(user, master.as_bytes(), &vault)?;

    if target_login == login {
        output::success(&format!("Updated login '{login}' at {site}"));
    } else {
        output::success(&format!(
            "Renamed login '{login}' to '{target_login}' at {site}"
        ));
    }

    Ok(())
}
