//! Error types for the bakery core.

use thiserror::Error;

/// Errors that can occur while building, verifying or decoding tokens.
#[derive(Debug, Error)]
pub enum MacaroonError {
    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("caveat not satisfied: {0}")]
    CaveatNotSatisfied(String),

    #[error("no discharge token for third-party caveat at {0}")]
    MissingDischarge(String),

    #[error("verification id cannot be opened")]
    VerificationId,

    #[error("encryption error: {0}")]
    EncryptionError(String),

    #[error("unsupported wire version: {0}")]
    UnsupportedVersion(u8),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, MacaroonError>;
