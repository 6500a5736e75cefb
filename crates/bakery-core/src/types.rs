//! Strong type definitions for the bakery.
//!
//! Identifiers and secrets are newtypes to prevent misuse at compile time.

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Opaque identifier of a root key, assigned by the root key store.
///
/// A root token's identifier is its key id, so a verifier can find the key
/// the token was minted with.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct KeyId(pub Vec<u8>);

impl KeyId {
    /// Create a new KeyId from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        Ok(Self(hex::decode(s)?))
    }
}

impl fmt::Debug for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyId({})", short_hex(&self.0))
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl AsRef<[u8]> for KeyId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for KeyId {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for KeyId {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Symmetric secret used to compute a token's base signature.
///
/// Also used for the per-caveat root keys of third-party caveats. The bytes
/// are wiped on drop and never printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct RootKey(Vec<u8>);

impl RootKey {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Key length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the key is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootKey(<{} bytes>)", self.0.len())
    }
}

/// A 32-byte HMAC-SHA256 chain value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacaroonSignature(pub [u8; 32]);

impl MacaroonSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Compare in constant time.
    pub fn ct_eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl fmt::Debug for MacaroonSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacaroonSignature({})", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for MacaroonSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for MacaroonSignature {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for MacaroonSignature {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into()?;
        Ok(Self(arr))
    }
}

fn short_hex(bytes: &[u8]) -> String {
    let mut hex = hex::encode(bytes);
    hex.truncate(16);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_id_hex_roundtrip() {
        let id = KeyId::from_bytes(vec![0x42; 16]);
        let recovered = KeyId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(id, recovered);
    }

    #[test]
    fn test_key_id_debug_truncates() {
        let id = KeyId::from_bytes(vec![0xab; 16]);
        assert_eq!(format!("{:?}", id), "KeyId(abababababababab)");

        let short = KeyId::from_bytes(vec![0x01]);
        assert_eq!(format!("{:?}", short), "KeyId(01)");
    }

    #[test]
    fn test_root_key_debug_is_redacted() {
        let key = RootKey::from_bytes(b"super secret".to_vec());
        let debug = format!("{:?}", key);
        assert!(!debug.contains("secret"));
        assert_eq!(debug, "RootKey(<12 bytes>)");
    }

    #[test]
    fn test_signature_ct_eq() {
        let a = MacaroonSignature::from_bytes([0x11; 32]);
        let b = MacaroonSignature::from_bytes([0x11; 32]);
        let c = MacaroonSignature::from_bytes([0x12; 32]);
        assert!(a.ct_eq(&b));
        assert!(!a.ct_eq(&c));
    }

    #[test]
    fn test_signature_try_from_wrong_length() {
        assert!(MacaroonSignature::try_from(&[0u8; 31][..]).is_err());
        assert!(MacaroonSignature::try_from(&[0u8; 32][..]).is_ok());
    }
}
