//! Configuration loaded from `vaultsafe.toml`.

pub mod settings;

pub use settings::Settings;
