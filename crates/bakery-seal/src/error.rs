//! Error types for key handling and envelopes.

use thiserror::Error;

/// Errors that can occur while sealing or opening secrets.
#[derive(Debug, Error)]
pub enum SealError {
    /// Authentication failed: wrong key, wrong nonce or tampered ciphertext.
    #[error("decryption failure")]
    DecryptionFailure,

    /// Encryption error.
    #[error("encryption error: {0}")]
    EncryptionError(String),

    /// Structurally invalid caveat identifier.
    #[error("malformed caveat identifier: {0}")]
    Malformed(String),

    /// Unknown caveat identifier version.
    #[error("unsupported caveat identifier version: {0}")]
    UnsupportedVersion(u8),

    /// Invalid encoded key material.
    #[error("invalid key: {0}")]
    KeyFormat(String),

    #[error("variable length quantity is too long")]
    VarIntTooLong,
}

/// Result type for seal operations.
pub type Result<T> = std::result::Result<T, SealError>;
