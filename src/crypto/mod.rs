//! Cryptographic primitives for VaultSafe.
//!
//! This module provides:
//! - AES-256-GCM encryption and decryption (`encryption`)
//! - PBKDF2-HMAC-SHA512 password-based key derivation (`kdf`)
//! - The zeroizing `MasterKey` and HKDF per-entry sub-keys (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{decrypt, encrypt, encrypt_with_nonce, Sealed, KEY_LEN, NONCE_LEN};
pub use kdf::{derive_key, derive_key_with_params, generate_salt, KdfParams, SALT_LEN};
pub use keys::{derive_entry_key, MasterKey};
