//! Discharge protocol message types.
//!
//! A client sends a [`DischargeRequest`] to the authority named in a
//! third-party caveat and gets back a [`DischargeResponse`]. Both are CBOR
//! on the wire.

use serde::{Deserialize, Serialize};

use bakery_core::{Macaroon, ThirdPartyCaveat};

use crate::error::{DischargeError, Result};

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// Ask an authority to discharge one caveat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DischargeRequest {
    /// Protocol version for compatibility checking.
    pub protocol_version: u8,

    /// The caveat to discharge.
    pub caveat: ThirdPartyCaveat,

    /// The value the client claims satisfies the caveat's condition.
    pub value: String,
}

impl DischargeRequest {
    /// Build a request at the current protocol version.
    pub fn new(caveat: ThirdPartyCaveat, value: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            caveat,
            value: value.into(),
        }
    }

    /// Encode to CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    /// Decode from CBOR, rejecting other protocol versions.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let request: Self = decode(bytes)?;
        if request.protocol_version != PROTOCOL_VERSION {
            return Err(DischargeError::VersionMismatch {
                local: PROTOCOL_VERSION,
                peer: request.protocol_version,
            });
        }
        Ok(request)
    }
}

/// An authority's answer.
///
/// A denial never carries a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DischargeResponse {
    /// Serialized discharge token.
    Discharged(Vec<u8>),
    /// The caveat was not discharged.
    Denied,
}

impl DischargeResponse {
    /// Wrap a discharge token.
    pub fn discharged(token: &Macaroon) -> Result<Self> {
        Ok(Self::Discharged(token.to_bytes()?))
    }

    /// Unwrap the discharge token, turning a denial into an error.
    pub fn into_macaroon(self) -> Result<Macaroon> {
        match self {
            Self::Discharged(bytes) => Ok(Macaroon::from_bytes(&bytes)?),
            Self::Denied => Err(DischargeError::Denied),
        }
    }

    /// Encode to CBOR.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }

    /// Decode from CBOR.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|e| DischargeError::Codec(e.to_string()))?;
    Ok(buf)
}

fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T> {
    ciborium::from_reader(bytes).map_err(|e| DischargeError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bakery_core::RootKey;

    fn caveat() -> ThirdPartyCaveat {
        ThirdPartyCaveat {
            location: "https://auth.example".into(),
            identifier: vec![2, 0xde, 0xad, 0xbe, 0xef],
            verification_id: vec![7; 72],
        }
    }

    #[test]
    fn test_request_roundtrip() {
        let request = DischargeRequest::new(caveat(), "bob");
        let decoded = DischargeRequest::from_bytes(&request.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_request_version_mismatch() {
        let mut request = DischargeRequest::new(caveat(), "bob");
        request.protocol_version = PROTOCOL_VERSION + 1;

        let result = DischargeRequest::from_bytes(&request.to_bytes().unwrap());
        assert!(matches!(
            result,
            Err(DischargeError::VersionMismatch { local, peer })
                if local == PROTOCOL_VERSION && peer == PROTOCOL_VERSION + 1
        ));
    }

    #[test]
    fn test_response_carries_token() {
        let key = RootKey::from_bytes(vec![1; 32]);
        let token = Macaroon::create("https://auth.example", &key, caveat().identifier);

        let response = DischargeResponse::discharged(&token).unwrap();
        let decoded = DischargeResponse::from_bytes(&response.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.into_macaroon().unwrap(), token);
    }

    #[test]
    fn test_denied_response() {
        let decoded =
            DischargeResponse::from_bytes(&DischargeResponse::Denied.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, DischargeResponse::Denied);
        assert!(matches!(
            decoded.into_macaroon(),
            Err(DischargeError::Denied)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            DischargeRequest::from_bytes(&[0xff, 0x00, 0x13]),
            Err(DischargeError::Codec(_))
        ));
        assert!(DischargeResponse::from_bytes(&[]).is_err());
    }
}
