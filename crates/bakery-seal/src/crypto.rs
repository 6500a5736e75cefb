//! Key material for sealing caveat secrets.
//!
//! X25519 key agreement, BLAKE3 key derivation, XChaCha20-Poly1305
//! authenticated encryption. These keys never sign or MAC tokens; they only
//! carry delegated secrets to a discharge authority.

use std::fmt;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use serde::{Deserialize, Serialize};
use x25519_dalek::StaticSecret;
use zeroize::{Zeroize, ZeroizeOnDrop};

use bakery_core::SecureRandom;

use crate::error::{Result, SealError};

/// Length of public and private keys.
pub const KEY_LEN: usize = 32;

/// Length of an envelope nonce.
pub const NONCE_LEN: usize = 24;

const ENVELOPE_KDF_LABEL: &str = "bakery-seal-v2-envelope";

/// An X25519 public key (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(pub [u8; KEY_LEN]);

impl PublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        Ok(Self(decode_key_hex(s)?))
    }

    /// First four bytes, used to route a caveat id to the right key.
    pub fn prefix(&self) -> [u8; 4] {
        [self.0[0], self.0[1], self.0[2], self.0[3]]
    }

    /// Convert to x25519-dalek PublicKey.
    pub fn to_dalek(&self) -> x25519_dalek::PublicKey {
        x25519_dalek::PublicKey::from(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", &self.to_hex()[..16])
    }
}

impl From<x25519_dalek::PublicKey> for PublicKey {
    fn from(pk: x25519_dalek::PublicKey) -> Self {
        Self(*pk.as_bytes())
    }
}

/// An X25519 static secret.
#[derive(Clone)]
pub struct PrivateKey(StaticSecret);

impl PrivateKey {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(StaticSecret::from(bytes))
    }

    /// Get the raw bytes. Handle with care.
    pub fn to_bytes(&self) -> [u8; KEY_LEN] {
        self.0.to_bytes()
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = decode_key_hex(s)?;
        let key = Self::from_bytes(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Derive the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(x25519_dalek::PublicKey::from(&self.0))
    }

    /// Perform key agreement with a peer's public key.
    pub fn diffie_hellman(&self, peer: &PublicKey) -> SharedKey {
        let shared = self.0.diffie_hellman(&peer.to_dalek());
        SharedKey(*shared.as_bytes())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>)")
    }
}

fn decode_key_hex(s: &str) -> Result<[u8; KEY_LEN]> {
    let bytes = hex::decode(s.trim()).map_err(|e| SealError::KeyFormat(e.to_string()))?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| SealError::KeyFormat(format!("expected {KEY_LEN} bytes, got {len}")))
}

/// A public/private X25519 pair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

/// Both halves of a key pair as hex strings, for provisioning peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedKeyPair {
    pub public: String,
    pub private: String,
}

impl KeyPair {
    /// Generate a fresh pair from `rng`.
    pub fn generate(rng: &SecureRandom) -> Self {
        let mut seed = rng.bytes::<KEY_LEN>();
        let private = PrivateKey::from_bytes(seed);
        seed.zeroize();
        Self::from_private(private)
    }

    /// Rebuild the pair from its private half.
    pub fn from_private(private: PrivateKey) -> Self {
        Self {
            public: private.public_key(),
            private,
        }
    }

    /// The public half.
    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The private half.
    pub fn private(&self) -> &PrivateKey {
        &self.private
    }

    /// Export both halves for operator provisioning.
    pub fn export(&self) -> ExportedKeyPair {
        ExportedKeyPair {
            public: self.public.to_hex(),
            private: self.private.to_hex(),
        }
    }

    /// Import an exported pair. Fails if the halves do not belong together.
    pub fn import(exported: &ExportedKeyPair) -> Result<Self> {
        let public = PublicKey::from_hex(&exported.public)?;
        let pair = Self::from_private(PrivateKey::from_hex(&exported.private)?);
        if pair.public != public {
            return Err(SealError::KeyFormat(
                "public key does not match private key".into(),
            ));
        }
        Ok(pair)
    }
}

/// Raw X25519 shared secret.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedKey([u8; KEY_LEN]);

impl SharedKey {
    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Derive the envelope key, bound to `context`.
    pub fn derive_encryption_key(&self, context: &[u8]) -> EncryptionKey {
        let mut hasher = blake3::Hasher::new_derive_key(ENVELOPE_KDF_LABEL);
        hasher.update(&self.0);
        hasher.update(context);
        EncryptionKey(*hasher.finalize().as_bytes())
    }
}

/// A 256-bit XChaCha20-Poly1305 key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Encrypt data with this key.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &EnvelopeNonce) -> Result<Vec<u8>> {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
            .encrypt(XNonce::from_slice(&nonce.0), plaintext)
            .map_err(|e| SealError::EncryptionError(e.to_string()))
    }

    /// Decrypt data with this key.
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &EnvelopeNonce) -> Result<Vec<u8>> {
        XChaCha20Poly1305::new(Key::from_slice(&self.0))
            .decrypt(XNonce::from_slice(&nonce.0), ciphertext)
            .map_err(|_| SealError::DecryptionFailure)
    }
}

/// A 192-bit XChaCha20 nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeNonce(pub [u8; NONCE_LEN]);

impl EnvelopeNonce {
    /// Draw a fresh nonce from `rng`.
    pub fn generate(rng: &SecureRandom) -> Self {
        Self(rng.bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; NONCE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; NONCE_LEN] {
        &self.0
    }
}
