//! # Bakery
//!
//! Delegable bearer tokens with attenuation and third-party discharge.
//!
//! ## Overview
//!
//! A bakery mints macaroons: bearer tokens whose holders can narrow them
//! further without talking to the issuer.
//!
//! - **Mint**: allocate a root key and issue a token with first-party caveats
//! - **Attenuate**: append caveats; a third-party caveat delegates a check to
//!   another authority by sealing a fresh secret for it
//! - **Discharge**: an authority proves its check passed by minting a
//!   discharge token under that secret
//! - **Verify**: recompute the whole signature chain, discharges included
//!
//! ## Key Concepts
//!
//! - **Condition**: `key <op> value`, the text of every caveat
//! - **Binding**: a discharge token is tied to one root token before use
//! - **Local caveat**: a third-party caveat addressed to the bakery itself
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use bakery::{Bakery, BakeryConfig, Caveat, Condition};
//! use bakery::seal::KeyPair;
//! use bakery::store::{MemoryRootKeyStore, MemoryThirdPartyRegistry};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Arc::new(MemoryThirdPartyRegistry::new());
//! registry.insert_key_pair("https://ts.example", KeyPair::generate(&Default::default())).unwrap();
//!
//! let bakery = Bakery::new(BakeryConfig::new(
//!     "https://ts.example",
//!     Arc::new(MemoryRootKeyStore::default()),
//!     registry,
//! ));
//!
//! let token = bakery
//!     .mint(&[Caveat::first_party(Condition::parse("user = bob").unwrap())])
//!     .await
//!     .unwrap();
//!
//! bakery.verify_exact(&[token], &["user = bob"]).await.unwrap();
//! # }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `bakery::core` - Token primitives (Macaroon, RootKey, wire format)
//! - `bakery::seal` - Key pairs and sealed caveat identifiers
//! - `bakery::store` - Root key store and third-party registry
//! - `bakery::discharge` - Discharge protocol and resolvers

pub mod bakery;
pub mod caveat;
pub mod condition;
pub mod error;
pub mod verifier;

// Re-export component crates
pub use bakery_core as core;
pub use bakery_discharge as discharge;
pub use bakery_seal as seal;
pub use bakery_store as store;

// Re-export main types for convenience
pub use crate::bakery::{Bakery, BakeryConfig, DEFAULT_MAX_DISCHARGES, DEFAULT_ROOT_KEY_SIZE};
pub use caveat::{Caveat, TokenCaveat, LOCAL_LOCATION};
pub use condition::{Condition, Operator, ParseError};
pub use error::{BakeryError, PublicError, Result};
pub use verifier::CaveatVerifier;

// Re-export commonly used core types
pub use bakery_core::{Encoding, KeyId, Macaroon, RootKey, SecureRandom, ThirdPartyCaveat};
pub use bakery_discharge::{discharger_fn, Discharger};
