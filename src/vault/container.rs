//! The decrypted, in-memory vault for one unlocked user.
//!
//! A `Vault` maps site identifiers to an ordered bucket of
//! `EncryptedRecord`s.  Unlocking only strips the outer envelope; each
//! credential stays encrypted until an operation needs it, and every
//! record is decrypted on its own so one damaged record never blocks the
//! rest of its site.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::credential::{Credential, Identity};
use super::record::EncryptedRecord;
use crate::crypto::MasterKey;
use crate::errors::{Result, VaultError};

/// Site bucket as it may appear in storage: older files hold a single
/// record where newer ones hold a list.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredBucket {
    Many(Vec<EncryptedRecord>),
    One(EncryptedRecord),
}

impl From<StoredBucket> for Vec<EncryptedRecord> {
    fn from(bucket: StoredBucket) -> Self {
        match bucket {
            StoredBucket::Many(records) => records,
            StoredBucket::One(record) => vec![record],
        }
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct SitesRef<'a>(&'a BTreeMap<String, Vec<EncryptedRecord>>);

/// Result of searching a site for a login name.
enum Lookup {
    Found(usize, Credential),
    Missing { undecryptable: usize },
}

/// One user's unlocked vault.
///
/// Holds the master key it was unlocked with (zeroized on drop) so that
/// entry operations can encrypt and decrypt records.
pub struct Vault {
    sites: BTreeMap<String, Vec<EncryptedRecord>>,
    key: MasterKey,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction and serialization
    // ------------------------------------------------------------------

    /// An empty vault bound to `key`.
    pub fn new(key: MasterKey) -> Self {
        Self {
            sites: BTreeMap::new(),
            key,
        }
    }

    /// Parse the decrypted envelope plaintext.
    pub(crate) fn from_plaintext(key: MasterKey, plaintext: &[u8]) -> Result<Self> {
        let stored: BTreeMap<String, StoredBucket> = serde_json::from_slice(plaintext)
            .map_err(|e| VaultError::Decode(format!("vault JSON: {e}")))?;

        let sites = stored
            .into_iter()
            .map(|(site, bucket)| (site, Vec::from(bucket)))
            .filter(|(_, records)| !records.is_empty())
            .collect();

        Ok(Self { sites, key })
    }

    /// Serialize to the plaintext that goes inside the envelope.
    pub(crate) fn to_plaintext(&self) -> Result<Zeroizing<Vec<u8>>> {
        serde_json::to_vec(&SitesRef(&self.sites))
            .map(Zeroizing::new)
            .map_err(|e| VaultError::Decode(format!("vault JSON: {e}")))
    }

    /// The key this vault was unlocked with.
    pub(crate) fn key(&self) -> &MasterKey {
        &self.key
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Site identifiers in sorted order.
    pub fn list_sites(&self) -> Vec<&str> {
        self.sites.keys().map(String::as_str).collect()
    }

    /// Decrypt every record at `site` and return its login name.
    ///
    /// A record that cannot be decrypted is listed as `"???"` instead of
    /// failing the whole listing.  An unknown site yields an empty list.
    pub fn list_identities_at(&self, site: &str) -> Vec<Identity> {
        let Some(records) = self.sites.get(site) else {
            return Vec::new();
        };

        records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let credential = record.open(&self.key).unwrap_or_else(|e| {
                    warn!(site, index, error = %e, "Record unreadable, using placeholder");
                    Credential::placeholder()
                });
                Identity {
                    index,
                    username: credential.username.clone(),
                }
            })
            .collect()
    }

    /// Return the plaintext credential whose login name is `username`.
    pub fn reveal_entry(&self, site: &str, username: &str) -> Result<Credential> {
        match self.lookup(site, username) {
            Lookup::Found(_, credential) => Ok(credential),
            Lookup::Missing { undecryptable } if undecryptable > 0 => {
                Err(VaultError::AuthenticationFailed)
            }
            Lookup::Missing { .. } => Err(not_found(site, username)),
        }
    }

    /// The still-encrypted records at `site`, empty for unknown sites.
    pub fn records_at(&self, site: &str) -> &[EncryptedRecord] {
        self.sites.get(site).map_or(&[][..], Vec::as_slice)
    }

    /// Total number of records across all sites.
    pub fn entry_count(&self) -> usize {
        self.sites.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Store a login for `site`.
    ///
    /// If the site already holds a record for `username` it is replaced
    /// in place; otherwise the new record is appended.
    pub fn add_entry(&mut self, site: &str, username: &str, password: &str) -> Result<()> {
        validate_field("site", site)?;
        validate_field("username", username)?;

        let record = EncryptedRecord::seal(&self.key, &Credential::new(username, password))?;

        match self.lookup(site, username) {
            Lookup::Found(index, _) => {
                debug!(site, index, "Replacing existing entry");
                self.bucket_mut(site)[index] = record;
            }
            Lookup::Missing { .. } => {
                debug!(site, "Appending new entry");
                self.sites.entry(site.to_string()).or_default().push(record);
            }
        }

        Ok(())
    }

    /// Replace the record for `username` at `site` with a freshly
    /// encrypted one holding the new login and password.
    pub fn update_entry(
        &mut self,
        site: &str,
        username: &str,
        new_username: &str,
        new_password: &str,
    ) -> Result<()> {
        validate_field("username", new_username)?;

        let index = match self.lookup(site, username) {
            Lookup::Found(index, _) => index,
            Lookup::Missing { .. } => return Err(not_found(site, username)),
        };

        if new_username != username {
            if let Lookup::Found(..) = self.lookup(site, new_username) {
                return Err(VaultError::EntryAlreadyExists {
                    site: site.to_string(),
                    username: new_username.to_string(),
                });
            }
        }

        let record =
            EncryptedRecord::seal(&self.key, &Credential::new(new_username, new_password))?;
        self.bucket_mut(site)[index] = record;
        debug!(site, index, "Entry updated");

        Ok(())
    }

    /// Remove the record for `username` at `site`.
    ///
    /// When the last record of a site goes, the site goes with it.
    pub fn delete_entry(&mut self, site: &str, username: &str) -> Result<()> {
        let index = match self.lookup(site, username) {
            Lookup::Found(index, _) => index,
            Lookup::Missing { .. } => return Err(not_found(site, username)),
        };

        let bucket = self.bucket_mut(site);
        bucket.remove(index);
        if bucket.is_empty() {
            self.sites.remove(site);
            debug!(site, "Site emptied and removed");
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lookup(&self, site: &str, username: &str) -> Lookup {
        let mut undecryptable = 0;

        for (index, record) in self.records_at(site).iter().enumerate() {
            match record.open(&self.key) {
                Ok(credential) if credential.username == username => {
                    return Lookup::Found(index, credential);
                }
                Ok(_) => {}
                Err(_) => undecryptable += 1,
            }
        }

        Lookup::Missing { undecryptable }
    }

    /// Only called after `lookup` found the site.
    fn bucket_mut(&mut self, site: &str) -> &mut Vec<EncryptedRecord> {
        self.sites.entry(site.to_string()).or_default()
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("sites", &self.sites.keys().collect::<Vec<_>>())
            .field("entries", &self.entry_count())
            .finish_non_exhaustive()
    }
}

fn not_found(site: &str, username: &str) -> VaultError {
    VaultError::EntryNotFound {
        site: site.to_string(),
        username: username.to_string(),
    }
}

fn validate_field(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(VaultError::InvalidInput(format!("{what} cannot be empty")));
    }
    Ok(())
}
