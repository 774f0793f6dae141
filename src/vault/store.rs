//! Registry-level operations: users and their encrypted vaults.
//!
//! `Store` owns nothing but the registry path and KDF settings.  Every
//! operation reads the whole file, works on it in memory, and (for
//! mutations) writes the whole file back, so there is no long-lived
//! registry state between calls.  The store performs no locking; callers
//! must not run overlapping operations on the same file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{
    self, derive_key, derive_key_with_params, generate_salt, KdfParams, MasterKey, SALT_LEN,
};
use crate::errors::{Result, VaultError};

use super::container::Vault;
use super::format::{self, UserRecord};

/// Summary of one user for display, without touching any ciphertext.
#[derive(Debug, Clone)]
pub struct UserSummary {
    pub username: String,
    pub created_at: Option<DateTime<Utc>>,
    pub kdf_iterations: u32,
}

/// File-backed user registry.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    kdf: KdfParams,
}

impl Store {
    /// A store backed by the registry file at `path`.
    ///
    /// New users get the default PBKDF2 iteration count.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kdf: KdfParams::default(),
        }
    }

    /// Use `params` when creating new users.  Existing users keep the
    /// count stored in their record.
    pub fn with_kdf_params(mut self, params: KdfParams) -> Self {
        self.kdf = params;
        self
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// All usernames, sorted.
    pub fn list_users(&self) -> Vec<String> {
        format::read_registry(&self.path).into_keys().collect()
    }

    /// Usernames plus creation metadata, sorted by username.
    pub fn user_summaries(&self) -> Vec<UserSummary> {
        format::read_registry(&self.path)
            .into_iter()
            .map(|(username, record)| UserSummary {
                username,
                created_at: record.created_at,
                kdf_iterations: record.kdf_iterations,
            })
            .collect()
    }

    /// Register `username` with an empty vault locked by `password`.
    pub fn create_user(&self, username: &str, password: &[u8]) -> Result<()> {
        if username.trim().is_empty() {
            return Err(VaultError::InvalidInput("username cannot be empty".into()));
        }

        let mut registry = format::read_registry(&self.path);
        if registry.contains_key(username) {
            return Err(VaultError::UserAlreadyExists(username.to_string()));
        }

        let salt = generate_salt();
        let key = derive_master_key(password, &salt, &self.kdf)?;
        let vault = Vault::new(key);
        let vault_data = seal_vault(&vault)?;

        registry.insert(
            username.to_string(),
            UserRecord {
                salt: format::encode_b64(&salt),
                kdf_iterations: self.kdf.iterations,
                created_at: Some(Utc::now()),
                vault_data,
            },
        );
        format::write_registry(&self.path, &registry)?;

        info!(username, iterations = self.kdf.iterations, "User created");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Vaults
    // ------------------------------------------------------------------

    /// Decrypt `username`'s vault with `password`.
    ///
    /// A wrong password and a damaged ciphertext both come back as
    /// `AuthenticationFailed`.  The key is derived before the stored
    /// envelope is even parsed so both paths cost the same.
    pub fn unlock_vault(&self, username: &str, password: &[u8]) -> Result<Vault> {
        let registry = format::read_registry(&self.path);
        let record = registry
            .get(username)
            .ok_or_else(|| VaultError::UserNotFound(username.to_string()))?;

        let key = derive_record_key(record, password)?;

        let sealed = format::decode_envelope(&record.vault_data)?;
        let plaintext = Zeroizing::new(crypto::decrypt(
            key.as_bytes(),
            &sealed.nonce,
            &sealed.ciphertext,
        )?);

        let vault = Vault::from_plaintext(key, &plaintext)?;
        debug!(username, sites = vault.list_sites().len(), "Vault unlocked");
        Ok(vault)
    }

    /// Re-encrypt `vault` with a fresh nonce and persist it as
    /// `username`'s vault.
    ///
    /// `password` must derive the same key the vault was unlocked with;
    /// otherwise nothing is written and `AuthenticationFailed` is returned.
    pub fn save_vault(&self, username: &str, password: &[u8], vault: &Vault) -> Result<()> {
        let mut registry = format::read_registry(&self.path);
        let record = registry
            .get_mut(username)
            .ok_or_else(|| VaultError::UserNotFound(username.to_string()))?;

        let key = derive_record_key(record, password)?;
        if !key.matches(vault.key()) {
            return Err(VaultError::AuthenticationFailed);
        }

        record.vault_data = seal_vault(vault)?;
        format::write_registry(&self.path, &registry)?;

        info!(username, entries = vault.entry_count(), "Vault saved");
        Ok(())
    }
}

/// PBKDF2 into a zeroizing `MasterKey`.
fn derive_master_key(password: &[u8], salt: &[u8], params: &KdfParams) -> Result<MasterKey> {
    let mut bytes = derive_key_with_params(password, salt, params)?;
    let key = MasterKey::new(bytes);
    bytes.zeroize();
    Ok(key)
}

/// Re-derive the master key from a stored record's salt and count.
///
/// A damaged salt or an out-of-range count fails as `AuthenticationFailed`
/// after a full default-cost derivation, the same way a wrong password does.
fn derive_record_key(record: &UserRecord, password: &[u8]) -> Result<MasterKey> {
    let params = KdfParams {
        iterations: record.kdf_iterations,
    };
    let stored = record
        .salt_bytes()
        .and_then(|salt| params.validate().map(|()| salt));

    match stored {
        Ok(salt) => derive_master_key(password, &salt, &params),
        Err(e) => {
            warn!(error = %e, "Stored KDF parameters unusable");
            let mut dummy = derive_key(password, &[0u8; SALT_LEN]);
            dummy.zeroize();
            Err(VaultError::AuthenticationFailed)
        }
    }
}

/// Encrypt the vault under its own key and encode it for `vault_data`.
fn seal_vault(vault: &Vault) -> Result<String> {
    let plaintext = vault.to_plaintext()?;
    let sealed = crypto::encrypt(vault.key().as_bytes(), &plaintext)?;
    format::encode_envelope(&sealed)
}
