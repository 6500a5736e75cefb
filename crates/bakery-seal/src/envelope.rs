//! Sealed secret parts.
//!
//! A secret part carries a caveat root key and its predicate to exactly one
//! discharge authority.
//!
//! ## Format
//!
//! ```text
//! plaintext  = version(1) || uvarint(len(root_key)) || root_key || predicate
//! key        = BLAKE3-derive(X25519(sender, recipient), sender_pub || recipient_pub)
//! ciphertext = XChaCha20-Poly1305(key, nonce, plaintext)
//! ```

use zeroize::Zeroizing;

use bakery_core::RootKey;

use crate::crypto::{EncryptionKey, EnvelopeNonce, PrivateKey, PublicKey, SharedKey};
use crate::error::{Result, SealError};
use crate::varint::{decode_uvarint_u32, encode_uvarint};

/// Version byte of the secret part plaintext.
pub const SECRET_PART_VERSION: u8 = 2;

/// What a recipient recovers from an envelope.
#[derive(Debug)]
pub struct OpenedSecret {
    /// Caveat root key.
    pub root_key: RootKey,
    /// Condition bytes.
    pub predicate: Vec<u8>,
}

/// Seal `root_key` and `predicate` for `recipient`.
///
/// `nonce` must never repeat for the same sender/recipient pair.
pub fn seal(
    recipient: &PublicKey,
    sender: &PrivateKey,
    nonce: &EnvelopeNonce,
    root_key: &RootKey,
    predicate: &[u8],
) -> Result<Vec<u8>> {
    let mut plaintext = Zeroizing::new(Vec::with_capacity(
        1 + 5 + root_key.len() + predicate.len(),
    ));
    plaintext.push(SECRET_PART_VERSION);
    encode_uvarint(root_key.len() as u64, &mut plaintext);
    plaintext.extend_from_slice(root_key.as_bytes());
    plaintext.extend_from_slice(predicate);

    let key = envelope_key(
        sender.diffie_hellman(recipient),
        &sender.public_key(),
        recipient,
    );
    key.encrypt(&plaintext, nonce)
}

/// Open an envelope sealed by `sender` for the holder of `recipient`.
///
/// Any authentication or format failure is reported as
/// [`SealError::DecryptionFailure`]; nothing is returned from a partially
/// valid envelope.
pub fn open(
    sender: &PublicKey,
    recipient: &PrivateKey,
    nonce: &EnvelopeNonce,
    ciphertext: &[u8],
) -> Result<OpenedSecret> {
    let key = envelope_key(
        recipient.diffie_hellman(sender),
        sender,
        &recipient.public_key(),
    );
    let plaintext = Zeroizing::new(key.decrypt(ciphertext, nonce)?);
    parse_secret_part(&plaintext).ok_or(SealError::DecryptionFailure)
}

fn envelope_key(shared: SharedKey, sender: &PublicKey, recipient: &PublicKey) -> EncryptionKey {
    let mut context = [0u8; 64];
    context[..32].copy_from_slice(sender.as_bytes());
    context[32..].copy_from_slice(recipient.as_bytes());
    shared.derive_encryption_key(&context)
}

fn parse_secret_part(plaintext: &[u8]) -> Option<OpenedSecret> {
    let (&version, rest) = plaintext.split_first()?;
    if version != SECRET_PART_VERSION {
        return None;
    }

    let (key_len, consumed) = decode_uvarint_u32(rest).ok()?;
    let rest = &rest[consumed..];
    let key_len = usize::try_from(key_len).ok()?;
    if rest.len() < key_len {
        return None;
    }

    let (root_key, predicate) = rest.split_at(key_len);
    Some(OpenedSecret {
        root_key: RootKey::from_bytes(root_key),
        predicate: predicate.to_vec(),
    })
}
