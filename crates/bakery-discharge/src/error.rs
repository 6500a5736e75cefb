//! Error types for the discharge protocol.

use thiserror::Error;

/// Errors that can occur while obtaining a discharge token.
#[derive(Debug, Error)]
pub enum DischargeError {
    /// The authority refused to discharge the caveat.
    #[error("discharge denied")]
    Denied,

    /// The authority failed for a reason other than a denial.
    #[error("authority error: {0}")]
    Authority(String),

    /// No authority is reachable at the caveat location.
    #[error("no discharge authority at {0}")]
    UnknownAuthority(String),

    /// Protocol version mismatch with peer.
    #[error("protocol version mismatch: local={local}, peer={peer}")]
    VersionMismatch { local: u8, peer: u8 },

    /// Message encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(String),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Timeout waiting for the authority.
    #[error("timeout: {0}")]
    Timeout(String),

    #[error("token error: {0}")]
    Token(#[from] bakery_core::MacaroonError),
}

/// Result type for discharge operations.
pub type Result<T> = std::result::Result<T, DischargeError>;
