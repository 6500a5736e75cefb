//! Cryptographic primitives for the token chain.
//!
//! HMAC-SHA256 for the signature chain and binding, XChaCha20-Poly1305 for
//! the verification id that carries a third-party caveat's root key.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    Key, XChaCha20Poly1305, XNonce,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{MacaroonError, Result};
use crate::types::{MacaroonSignature, RootKey};

type HmacSha256 = Hmac<Sha256>;

/// Nonce length for verification ids.
pub const VID_NONCE_LEN: usize = 24;

fn keyed(key: &[u8]) -> HmacSha256 {
    <HmacSha256 as Mac>::new_from_slice(key).expect("HMAC accepts keys of any length")
}

/// Compute `HMAC-SHA256(key, message)`.
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> MacaroonSignature {
    let mut mac = keyed(key);
    mac.update(message);
    MacaroonSignature(mac.finalize().into_bytes().into())
}

/// Bind a discharge signature to a root signature.
///
/// The result only verifies in the context of that one root token.
pub fn bind_signature(
    root_signature: &MacaroonSignature,
    discharge_signature: &MacaroonSignature,
) -> MacaroonSignature {
    hmac_sha256(root_signature.as_bytes(), discharge_signature.as_bytes())
}

/// Encrypt a caveat root key under the current chain signature.
///
/// Output layout: `nonce(24) || ciphertext`.
pub fn seal_verification_id(
    signature: &MacaroonSignature,
    caveat_root_key: &RootKey,
    nonce: &[u8; VID_NONCE_LEN],
) -> Result<Vec<u8>> {
    let cipher = XChaCha20Poly1305::new(Key::from_slice(signature.as_bytes()));
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(nonce), caveat_root_key.as_bytes())
        .map_err(|e| MacaroonError::EncryptionError(e.to_string()))?;

    let mut vid = Vec::with_capacity(VID_NONCE_LEN + ciphertext.len());
    vid.extend_from_slice(nonce);
    vid.extend_from_slice(&ciphertext);
    Ok(vid)
}

/// Recover a caveat root key from a verification id.
pub fn open_verification_id(signature: &MacaroonSignature, vid: &[u8]) -> Result<RootKey> {
    if vid.len() < VID_NONCE_LEN {
        return Err(MacaroonError::VerificationId);
    }
    let (nonce, ciphertext) = vid.split_at(VID_NONCE_LEN);

    let cipher = XChaCha20Poly1305::new(Key::from_slice(signature.as_bytes()));
    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map(RootKey::from_bytes)
        .map_err(|_| MacaroonError::VerificationId)
}
