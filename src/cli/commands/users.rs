//! `vaultsafe users` — list registered users.

use crate::cli::output;
use crate::cli::{open_store, Cli};
use crate::errors::Result;

/// Execute the `users` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let (store, _) = open_store(cli)?;
    output::print_users_table(&store.user_summaries());
    Ok(())
}
