//! Password-based key derivation using PBKDF2-HMAC-SHA512.
//!
//! The iteration count is the only tunable.  It is stored alongside each
//! user record so vaults created under an older count stay openable after
//! the default changes.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha512;

use super::encryption::KEY_LEN;
use crate::errors::{Result, VaultError};

/// Length of a salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Iteration count used for new users unless configured otherwise.
pub const DEFAULT_ITERATIONS: u32 = 200_000;

/// Lowest iteration count accepted from config or from a stored record.
pub const MIN_ITERATIONS: u32 = 10_000;

/// Highest iteration count accepted from config or from a stored record.
pub const MAX_ITERATIONS: u32 = 10_000_000;

/// PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Reject iteration counts outside `MIN_ITERATIONS..=MAX_ITERATIONS`.
    pub fn validate(&self) -> Result<()> {
        if self.iterations < MIN_ITERATIONS {
            return Err(VaultError::KeyDerivationFailed(format!(
                "PBKDF2 iterations must be at least {MIN_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(VaultError::KeyDerivationFailed(format!(
                "PBKDF2 iterations must be at most {MAX_ITERATIONS} (got {})",
                self.iterations
            )));
        }
        Ok(())
    }
}

/// Derive a 32-byte key from a password and salt with the default count.
///
/// Deterministic, and accepts an empty password.
pub fn derive_key(password: &[u8], salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password, salt, DEFAULT_ITERATIONS, &mut key);
    key
}

/// Derive a 32-byte key with explicit parameters.
pub fn derive_key_with_params(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<[u8; KEY_LEN]> {
    params.validate()?;

    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha512>(password, salt, params.iterations, &mut key);
    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}
