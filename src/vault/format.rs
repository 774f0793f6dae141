//! On-disk registry format.
//!
//! The registry is one pretty-printed JSON document mapping usernames to
//! user records:
//!
//! ```text
//! {
//!   "<username>": {
//!     "salt": "<base64, 16 bytes>",
//!     "kdf_iterations": 200000,
//!     "created_at": "<RFC 3339>",
//!     "vault_data": "<base64 of {\"iv\": base64, \"ciphertext\": base64}>"
//!   }
//! }
//! ```
//!
//! Binary fields inside user records are kept as strings until they are
//! needed, so a damaged field in one record surfaces as a decode error
//! for that user instead of making the whole file unreadable.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::crypto::kdf::DEFAULT_ITERATIONS;
use crate::crypto::{Sealed, NONCE_LEN, SALT_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The whole persisted file: username -> user record.
pub type Registry = BTreeMap<String, UserRecord>;

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

/// Everything stored for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Per-user PBKDF2 salt (base64).  Fixed at creation.
    pub salt: String,

    /// PBKDF2 iteration count the salt was used with.
    #[serde(default = "default_iterations")]
    pub kdf_iterations: u32,

    /// When the user was created.  Absent in files from older versions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Encrypted vault envelope, see `encode_envelope`.
    pub vault_data: String,
}

impl UserRecord {
    /// Decode and length-check the stored salt.
    pub fn salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        let raw = BASE64
            .decode(&self.salt)
            .map_err(|e| VaultError::Decode(format!("salt: {e}")))?;
        raw.as_slice().try_into().map_err(|_| {
            VaultError::Decode(format!("salt must be {SALT_LEN} bytes, got {}", raw.len()))
        })
    }
}

/// JSON shape wrapped inside `vault_data`.
#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    iv: Vec<u8>,
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    ciphertext: Vec<u8>,
}

// ---------------------------------------------------------------------------
// Envelope codec
// ---------------------------------------------------------------------------

/// Encode a sealed vault as `base64(JSON{iv, ciphertext})`.
pub fn encode_envelope(sealed: &Sealed) -> Result<String> {
    let envelope = Envelope {
        iv: sealed.nonce.to_vec(),
        ciphertext: sealed.ciphertext.clone(),
    };
    let json = serde_json::to_vec(&envelope)
        .map_err(|e| VaultError::Decode(format!("envelope: {e}")))?;
    Ok(BASE64.encode(json))
}

/// Decode the output of `encode_envelope`.
///
/// This is purely structural; nothing is decrypted here.
pub fn decode_envelope(vault_data: &str) -> Result<Sealed> {
    let json = BASE64
        .decode(vault_data)
        .map_err(|e| VaultError::Decode(format!("vault_data: {e}")))?;
    let envelope: Envelope = serde_json::from_slice(&json)
        .map_err(|e| VaultError::Decode(format!("vault_data JSON: {e}")))?;

    let nonce: [u8; NONCE_LEN] = envelope.iv.as_slice().try_into().map_err(|_| {
        VaultError::Decode(format!(
            "iv must be {NONCE_LEN} bytes, got {}",
            envelope.iv.len()
        ))
    })?;

    Ok(Sealed {
        nonce,
        ciphertext: envelope.ciphertext,
    })
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Load the registry from `path`.
///
/// A missing, unreadable, or unparsable file yields an empty registry.
/// This is the only place a failure is swallowed.
pub fn read_registry(path: &Path) -> Registry {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = ?path, "No registry file yet, starting empty");
            return Registry::new();
        }
        Err(e) => {
            warn!(path = ?path, error = %e, "Registry unreadable, treating as empty");
            return Registry::new();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(registry) => registry,
        Err(e) => {
            warn!(path = ?path, error = %e, "Registry unparsable, treating as empty");
            Registry::new()
        }
    }
}

/// Write the registry to disk **atomically**.
///
/// The JSON is written to a temp file in the same directory and then
/// renamed over the target, so readers never see a half-written file.
pub fn write_registry(path: &Path, registry: &Registry) -> Result<()> {
    let json = serde_json::to_vec_pretty(registry)
        .map_err(|e| VaultError::Decode(format!("registry: {e}")))?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    // A stale temp file may carry looser permissions; start from scratch.
    match fs::remove_file(&tmp_path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    // Owner-only read/write on Unix, from the moment the file exists.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(&tmp_path)?;
    file.write_all(&json)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    debug!(path = ?path, users = registry.len(), "Registry written");

    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

/// Base64-encode raw bytes with the registry's alphabet.
pub(crate) fn encode_b64(data: &[u8]) -> String {
    BASE64.encode(data)
}
