//! # Bakery Seal
//!
//! Asymmetric sealing of delegated secrets.
//!
//! ## Overview
//!
//! When a token holder adds a third-party caveat, the caveat root key and
//! the condition must reach the named discharge authority and nobody else.
//! This crate seals them with X25519 key agreement and XChaCha20-Poly1305,
//! and packs the result into the caveat identifier.
//!
//! ## Key Types
//!
//! - [`KeyPair`] - X25519 pair, generated from an injected [`SecureRandom`](bakery_core::SecureRandom)
//! - [`ThirdPartyCaveatId`] - Self-describing caveat identifier carrying the envelope
//! - [`envelope::seal`] / [`envelope::open`] - The raw envelope operations
//!
//! ## Usage
//!
//! ```rust
//! use bakery_core::{RootKey, SecureRandom};
//! use bakery_seal::{EnvelopeNonce, KeyPair, ThirdPartyCaveatId};
//!
//! let rng = SecureRandom::os();
//! let sender = KeyPair::generate(&rng);
//! let authority = KeyPair::generate(&rng);
//!
//! let id = ThirdPartyCaveatId::seal(
//!     authority.public(),
//!     &sender,
//!     EnvelopeNonce::generate(&rng),
//!     &RootKey::from_bytes(rng.vec(32)),
//!     b"user = bob",
//! )
//! .unwrap();
//!
//! let opened = ThirdPartyCaveatId::from_bytes(&id.to_bytes())
//!     .unwrap()
//!     .open(&authority)
//!     .unwrap();
//! assert_eq!(opened.predicate, b"user = bob");
//! ```

pub mod caveat_id;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod varint;

pub use caveat_id::{ThirdPartyCaveatId, CAVEAT_ID_VERSION};
pub use crypto::{
    EncryptionKey, EnvelopeNonce, ExportedKeyPair, KeyPair, PrivateKey, PublicKey, SharedKey,
    KEY_LEN, NONCE_LEN,
};
pub use envelope::{open, seal, OpenedSecret};
pub use error::{Result, SealError};
