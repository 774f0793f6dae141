//! Per-entry encrypted records.
//!
//! Each record encrypts exactly one `Credential` under a sub-key derived
//! from the master key and the record's own random salt.  Re-encrypting
//! always draws a new salt and a new nonce.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::credential::Credential;
use super::format::{base64_decode, base64_encode};
use crate::crypto::{self, MasterKey, SALT_LEN};
use crate::errors::{Result, VaultError};

/// `{salt, iv, ciphertext}` with base64 fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRecord {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub iv: Vec<u8>,

    /// Ciphertext plus the GCM tag.
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedRecord {
    /// Encrypt `credential` with a fresh salt and nonce.
    pub fn seal(key: &MasterKey, credential: &Credential) -> Result<Self> {
        let salt = crypto::generate_salt();
        let entry_key = key.entry_key(&salt)?;
        let plaintext = credential.to_bytes()?;
        let sealed = crypto::encrypt(&entry_key, &plaintext)?;

        Ok(Self {
            salt: salt.to_vec(),
            iv: sealed.nonce.to_vec(),
            ciphertext: sealed.ciphertext,
        })
    }

    /// Decrypt back into a `Credential`.
    ///
    /// A salt of the wrong length is a `Decode` error; anything that
    /// fails authentication is `AuthenticationFailed`.
    pub fn open(&self, key: &MasterKey) -> Result<Credential> {
        if self.salt.len() != SALT_LEN {
            return Err(VaultError::Decode(format!(
                "record salt must be {SALT_LEN} bytes, got {}",
                self.salt.len()
            )));
        }

        let entry_key = key.entry_key(&self.salt)?;
        let plaintext = Zeroizing::new(crypto::decrypt(&entry_key, &self.iv, &self.ciphertext)?);
        Credential::from_bytes(&plaintext)
    }
}
