use thiserror::Error;

/// All errors that can occur in VaultSafe.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong master password or tampered/corrupt ciphertext. The two are
    /// deliberately indistinguishable.
    #[error("Authentication failed — wrong password or corrupted data")]
    AuthenticationFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Registry errors ---
    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    /// Malformed container JSON or record shape, independent of crypto.
    #[error("Malformed vault data: {0}")]
    Decode(String),

    // --- Entry errors ---
    #[error("No entry for '{username}' at {site}")]
    EntryNotFound { site: String, username: String },

    #[error("An entry for '{username}' already exists at {site}")]
    EntryAlreadyExists { site: String, username: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl VaultError {
    /// Message suitable for showing to a person at the terminal.
    ///
    /// Authentication and decode failures collapse into the same text so
    /// the output never reveals whether the password was wrong or the
    /// stored data was damaged.
    pub fn user_message(&self) -> String {
        match self {
            VaultError::AuthenticationFailed | VaultError::Decode(_) => {
                VaultError::AuthenticationFailed.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for VaultSafe results.
pub type Result<T> = std::result::Result<T, VaultError>;
