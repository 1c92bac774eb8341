//! Error types for the key store and token issuer.

use thiserror::Error;

/// Errors that can occur during key management and token issuance.
#[derive(Debug, Error)]
pub enum KeysError {
    /// A key with this ID already exists in the store.
    #[error("key with ID {0} already exists")]
    DuplicateKeyId(String),

    /// No key with this ID exists in the store.
    #[error("key not found: {0}")]
    KeyNotFound(String),

    /// Removing this key would leave the store empty.
    #[error("cannot remove key {0}: at least one key must remain")]
    LastKeyProtected(String),

    /// The store holds no keys.
    #[error("no keys available")]
    NoKeysAvailable,

    /// No signing key could be selected for token issuance.
    #[error("failed to get signing key")]
    SigningKeyUnavailable,

    /// RSA key generation failed.
    #[error("failed to generate RSA key for {kid}: {reason}")]
    KeyGenerationFailed { kid: String, reason: String },

    /// Signing the token failed.
    #[error("failed to sign token: {0}")]
    SigningFailed(String),
}
