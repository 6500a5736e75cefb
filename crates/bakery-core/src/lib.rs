//! # Bakery Core
//!
//! Pure primitives for the bakery: chained-MAC bearer tokens (macaroons),
//! caveat packets, discharge binding, verification and the wire format.
//!
//! This crate contains no I/O, no storage, no networking. It is pure computation
//! over byte buffers.
//!
//! ## Key Types
//!
//! - [`Macaroon`] - A bearer token: location, identifier, ordered caveats, signature
//! - [`CaveatPacket`] - One caveat exactly as carried on the token
//! - [`ThirdPartyCaveat`] - A view of a caveat that needs a discharge token
//! - [`KeyId`] / [`RootKey`] - Root key identifier and secret
//! - [`SecureRandom`] - Injected CSPRNG handle
//!
//! ## Signature Chain
//!
//! ```text
//! sig_0 = HMAC-SHA256(root_key, identifier)
//! sig_i = HMAC-SHA256(sig_{i-1}, predicate)          first-party caveat
//! sig_i = HMAC-SHA256(sig_{i-1}, identifier)         third-party caveat
//! bound = HMAC-SHA256(root_signature, discharge_sig)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bakery_core::{Macaroon, RootKey};
//!
//! let key = RootKey::from_bytes(b"a very secret root key".to_vec());
//! let token = Macaroon::create("https://bakery.example", &key, b"key-1".to_vec())
//!     .add_first_party_caveat(b"user = bob".to_vec());
//!
//! token
//!     .verify(&key, &[], |predicate| predicate == b"user = bob")
//!     .unwrap();
//! ```

pub mod crypto;
pub mod error;
pub mod macaroon;
pub mod random;
pub mod types;
pub mod verification;
pub mod wire;

pub use crypto::{bind_signature, hmac_sha256, VID_NONCE_LEN};
pub use error::{MacaroonError, Result};
pub use macaroon::{CaveatPacket, Macaroon, ThirdPartyCaveat};
pub use random::SecureRandom;
pub use types::{KeyId, MacaroonSignature, RootKey};
pub use wire::{decode_all, encode_all, Encoding, WIRE_VERSION};
