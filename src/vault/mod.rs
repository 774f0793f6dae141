//! Vault module — encrypted credential storage.
//!
//! This module provides:
//! - `Credential` and `Identity` plaintext types (`credential`)
//! - Per-entry `EncryptedRecord`s (`record`)
//! - The unlocked, in-memory `Vault` and its entry operations (`container`)
//! - The JSON registry file format (`format`)
//! - `Store`, which creates, unlocks, and saves user vaults (`store`)

pub mod container;
pub mod credential;
pub mod format;
pub mod record;
pub mod store;

// Re-export the most commonly used items.
pub use container::Vault;
pub use credential::{Credential, Identity, PLACEHOLDER};
pub use record::EncryptedRecord;
pub use store::{Store, UserSummary};
