//! Error types for the bakery.
//!
//! [`BakeryError`] is for diagnostics and logs. Anything shown to a remote
//! caller goes through [`BakeryError::public`] first.

use bakery_core::{KeyId, MacaroonError};
use bakery_discharge::DischargeError;
use bakery_seal::SealError;
use bakery_store::StoreError;
use thiserror::Error;

use crate::condition::ParseError;

/// Errors that can occur during bakery operations.
#[derive(Debug, Error)]
pub enum BakeryError {
    /// Malformed condition text.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Third-party caveat passed to mint.
    #[error("unsupported caveat: {0}")]
    UnsupportedCaveat(String),

    /// No key registered for a location.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// Root key missing or expired.
    #[error("unknown root key id: {0}")]
    UnknownKeyId(KeyId),

    /// A sealed caveat identifier failed to open.
    #[error("decryption failure")]
    DecryptionFailure,

    /// The presented value does not satisfy the delegated condition.
    #[error("discharge denied")]
    DischargeDenied,

    /// A resolver returned a token for the wrong caveat.
    #[error("invalid discharge: {0}")]
    InvalidDischarge(String),

    /// Discharge resolution needed more tokens than allowed.
    #[error("discharge limit of {0} tokens exceeded")]
    DischargeLimit(usize),

    /// An operation that needs at least a root token got none.
    #[error("no tokens")]
    NoTokens,

    /// Token verification failed.
    #[error("verification failed: {0}")]
    Verification(#[from] MacaroonError),

    /// Token bytes could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[source] MacaroonError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Envelope error other than an authentication failure.
    #[error("seal error: {0}")]
    Seal(SealError),

    /// Discharge exchange failed.
    #[error("discharge error: {0}")]
    Discharge(#[from] DischargeError),
}

impl From<SealError> for BakeryError {
    fn from(e: SealError) -> Self {
        match e {
            SealError::DecryptionFailure
            | SealError::Malformed(_)
            | SealError::UnsupportedVersion(_)
            | SealError::VarIntTooLong => Self::DecryptionFailure,
            other => Self::Seal(other),
        }
    }
}

/// What a remote caller is allowed to learn about a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PublicError {
    /// Every cryptographic, verification and lookup failure.
    #[error("not authorized")]
    NotAuthorized,

    /// The request itself was malformed.
    #[error("bad request")]
    BadRequest,
}

impl BakeryError {
    /// Collapse to the outcome shown to remote callers.
    ///
    /// Wrong key, tampered data, expired key id and failed verification all
    /// look the same from outside.
    pub fn public(&self) -> PublicError {
        match self {
            Self::Parse(_)
            | Self::UnsupportedCaveat(_)
            | Self::UnknownLocation(_)
            | Self::NoTokens
            | Self::Serialization(_) => PublicError::BadRequest,
            _ => PublicError::NotAuthorized,
        }
    }
}

/// Lets a bakery-backed closure act as a resolver.
impl From<BakeryError> for DischargeError {
    fn from(e: BakeryError) -> Self {
        match e {
            BakeryError::DischargeDenied => DischargeError::Denied,
            BakeryError::Discharge(inner) => inner,
            other => DischargeError::Authority(other.to_string()),
        }
    }
}

/// Result type for bakery operations.
pub type Result<T> = std::result::Result<T, BakeryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_failures_are_indistinguishable() {
        let failures = [
            BakeryError::DecryptionFailure,
            BakeryError::UnknownKeyId(KeyId::from_bytes(vec![1; 16])),
            BakeryError::Verification(MacaroonError::SignatureMismatch),
            BakeryError::Verification(MacaroonError::VerificationId),
            BakeryError::DischargeDenied,
        ];
        for failure in &failures {
            assert_eq!(failure.public(), PublicError::NotAuthorized);
            assert_eq!(failure.public().to_string(), "not authorized");
        }
    }

    #[test]
    fn test_caller_errors_are_bad_requests() {
        assert_eq!(
            BakeryError::UnsupportedCaveat("x".into()).public(),
            PublicError::BadRequest
        );
        assert_eq!(BakeryError::NoTokens.public(), PublicError::BadRequest);
    }

    #[test]
    fn test_seal_error_mapping() {
        assert!(matches!(
            BakeryError::from(SealError::Malformed("short".into())),
            BakeryError::DecryptionFailure
        ));
        assert!(matches!(
            BakeryError::from(SealError::KeyFormat("bad".into())),
            BakeryError::Seal(_)
        ));
    }

    #[test]
    fn test_into_discharge_error() {
        assert!(matches!(
            DischargeError::from(BakeryError::DischargeDenied),
            DischargeError::Denied
        ));
        assert!(matches!(
            DischargeError::from(BakeryError::DecryptionFailure),
            DischargeError::Authority(_)
        ));
    }
}
