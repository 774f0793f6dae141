//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Identity, UserSummary, Vault};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of users (User, Created, KDF iterations).
pub fn print_users_table(users: &[UserSummary]) {
    if users.is_empty() {
        info("No users registered yet.");
        tip("Run `vaultsafe create-user <name>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["User", "Created", "KDF iterations"]);

    for u in users {
        let created = u
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            u.username.clone(),
            created,
            u.kdf_iterations.to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a table of sites and how many logins each holds.
pub fn print_sites_table(vault: &Vault) {
    if vault.is_empty() {
        info("This vault is empty.");
        tip("Run `vaultsafe add <user> <site> <login>` to store a login.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Site", "Logins"]);

    for site in vault.list_sites() {
        table.add_row(vec![
            site.to_string(),
            vault.records_at(site).len().to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the logins stored at one site (#, Login).
pub fn print_identities_table(identities: &[Identity]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Login"]);

    for id in identities {
        table.add_row(vec![id.index.to_string(), id.username.clone()]);
    }

    println!("{table}");
}
