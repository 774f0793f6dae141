use clap::Parser;
use vaultsafe::cli::{Cli, Commands};

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Users => vaultsafe::cli::commands::users::execute(&cli),
        Commands::CreateUser { ref user } => {
            vaultsafe::cli::commands::create_user::execute(&cli, user)
        }
        Commands::Sites { ref user } => vaultsafe::cli::commands::sites::execute(&cli, user),
        Commands::List { ref user, ref site } => {
            vaultsafe::cli::commands::list::execute(&cli, user, site)
        }
        Commands::Add {
            ref user,
            ref site,
            ref login,
            ref password,
        } => vaultsafe::cli::commands::add::execute(&cli, user, site, login, password.as_deref()),
        Commands::Show {
            ref user,
            ref site,
            ref login,
            copy,
        } => vaultsafe::cli::commands::show::execute(&cli, user, site, login, copy),
        Commands::Edit {
            ref user,
            ref site,
            ref login,
            ref new_login,
            ref new_password,
        } => vaultsafe::cli::commands::edit::execute(
            &cli,
            user,
            site,
            login,
            new_login.as_deref(),
            new_password.as_deref(),
        ),
        Commands::Delete {
            ref user,
            ref site,
            ref login,
            force,
        } => vaultsafe::cli::commands::delete::execute(&cli, user, site, login, force),
    };

    if let Err(e) = result {
        vaultsafe::cli::output::error(&e.user_message());
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_logging() {
    use tracing_subscriber::{filter::EnvFilter, fmt};

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
