//! One module per subcommand.

pub mod add;
pub mod create_user;
pub mod delete;
pub mod edit;
pub mod list;
pub mod show;
pub mod sites;
pub mod users;
