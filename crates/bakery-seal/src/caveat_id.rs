//! Third-party caveat identifiers.
//!
//! The identifier of a third-party caveat is everything the authority needs
//! to recover the caveat root key and condition:
//!
//! ```text
//! version(1) || recipient_pub[0..4] || sender_pub(32) || nonce(24) || sealed
//! ```

use bakery_core::RootKey;
use subtle::ConstantTimeEq;

use crate::crypto::{EnvelopeNonce, KeyPair, PublicKey, KEY_LEN, NONCE_LEN};
use crate::envelope::{self, OpenedSecret};
use crate::error::{Result, SealError};

/// Version byte of the identifier layout.
pub const CAVEAT_ID_VERSION: u8 = 2;

const PREFIX_LEN: usize = 4;
const HEADER_LEN: usize = 1 + PREFIX_LEN + KEY_LEN + NONCE_LEN;
const TAG_LEN: usize = 16;

/// A parsed third-party caveat identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyCaveatId {
    /// First bytes of the authority's public key.
    pub recipient_prefix: [u8; PREFIX_LEN],

    /// Public key of the party that added the caveat.
    pub sender: PublicKey,

    /// Envelope nonce.
    pub nonce: EnvelopeNonce,

    /// The sealed secret part.
    pub sealed: Vec<u8>,
}

impl ThirdPartyCaveatId {
    /// Seal a caveat root key and condition for `recipient`.
    pub fn seal(
        recipient: &PublicKey,
        sender: &KeyPair,
        nonce: EnvelopeNonce,
        root_key: &RootKey,
        predicate: &[u8],
    ) -> Result<Self> {
        let sealed = envelope::seal(recipient, sender.private(), &nonce, root_key, predicate)?;
        Ok(Self {
            recipient_prefix: recipient.prefix(),
            sender: *sender.public(),
            nonce,
            sealed,
        })
    }

    /// Encode to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.sealed.len());
        out.push(CAVEAT_ID_VERSION);
        out.extend_from_slice(&self.recipient_prefix);
        out.extend_from_slice(self.sender.as_bytes());
        out.extend_from_slice(self.nonce.as_bytes());
        out.extend_from_slice(&self.sealed);
        out
    }

    /// Decode from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (&version, _) = bytes
            .split_first()
            .ok_or_else(|| SealError::Malformed("empty identifier".into()))?;
        if version != CAVEAT_ID_VERSION {
            return Err(SealError::UnsupportedVersion(version));
        }
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(SealError::Malformed(format!(
                "identifier too short: {} bytes",
                bytes.len()
            )));
        }

        let mut prefix = [0u8; PREFIX_LEN];
        prefix.copy_from_slice(&bytes[1..1 + PREFIX_LEN]);

        let mut sender = [0u8; KEY_LEN];
        sender.copy_from_slice(&bytes[1 + PREFIX_LEN..1 + PREFIX_LEN + KEY_LEN]);

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[1 + PREFIX_LEN + KEY_LEN..HEADER_LEN]);

        Ok(Self {
            recipient_prefix: prefix,
            sender: PublicKey::from_bytes(sender),
            nonce: EnvelopeNonce::from_bytes(nonce),
            sealed: bytes[HEADER_LEN..].to_vec(),
        })
    }

    /// Open with the authority's key pair.
    ///
    /// An identifier addressed to a different key fails exactly like a
    /// tampered one.
    pub fn open(&self, recipient: &KeyPair) -> Result<OpenedSecret> {
        // Both checks always run; either failing reads as DecryptionFailure.
        let opened = envelope::open(&self.sender, recipient.private(), &self.nonce, &self.sealed);
        let addressed: bool = self.recipient_prefix[..]
            .ct_eq(&recipient.public().prefix()[..])
            .into();

        match opened {
            Ok(secret) if addressed => Ok(secret),
            _ => Err(SealError::DecryptionFailure),
        }
    }
}
