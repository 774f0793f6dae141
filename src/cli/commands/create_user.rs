//! `vaultsafe create-user` — register a user with an empty vault.

use crate::cli::output;
use crate::cli::{clean_input, open_store, prompt_new_password, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `create-user` command.
pub fn execute(cli: &Cli, user: &str) -> Result<()> {
    let user = clean_input(user);
    let (store, _) = open_store(cli)?;

    // Check before prompting so a taken name fails fast.
    if store.list_users().iter().any(|u| u == user) {
        return Err(VaultError::UserAlreadyExists(user.to_string()));
    }

    let password = prompt_new_password(user)?;
    store.create_user(user, password.as_bytes())?;

    output::success(&format!(
        "User '{user}' created in {}",
        store.path().display()
    ));
    output::warning("The master password is never stored. If you forget it, this vault cannot be recovered.");
    output::tip(&format!("Add a login: vaultsafe add {user} <site> <login>"));

    Ok(())
}
