//! Master key handling and per-entry sub-keys.
//!
//! The master key comes out of PBKDF2 once per unlock.  Each credential
//! record is then encrypted under its own sub-key:
//!
//! `HKDF-SHA256(ikm = master key, salt = record salt, info = "vaultsafe-entry")`
//!
//! so a fresh record salt gives a fresh key without paying the PBKDF2 cost
//! again.

use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::KEY_LEN;
use crate::errors::{Result, VaultError};

const ENTRY_INFO: &[u8] = b"vaultsafe-entry";

/// Derive the encryption key for one credential record.
pub fn derive_entry_key(master_key: &[u8], record_salt: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(Some(record_salt), master_key);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(ENTRY_INFO, &mut okm)
        .map_err(|e| VaultError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Wrap raw key bytes.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Derive the sub-key for a record with the given salt.
    ///
    /// The returned key is wiped when it goes out of scope.
    pub fn entry_key(&self, record_salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>> {
        derive_entry_key(&self.bytes, record_salt).map(Zeroizing::new)
    }

    /// Constant-time equality against another key.
    pub fn matches(&self, other: &MasterKey) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey(..)")
    }
}
