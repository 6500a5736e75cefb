//! # Bakery Store
//!
//! Key storage for the bakery.
//!
//! ## Overview
//!
//! A bakery needs two lookups: the root key a token was minted under, and
//! the encryption key of every discharge authority it delegates to. Both sit
//! behind async traits so a deployment can back them with a database or a
//! shared cache.
//!
//! ## Key Types
//!
//! - [`RootKeyStore`] - Allocates and looks up root keys by [`KeyId`](bakery_core::KeyId)
//! - [`ThirdPartyRegistry`] - Maps authority locations to keys
//! - [`MemoryRootKeyStore`] / [`MemoryThirdPartyRegistry`] - In-memory implementations
//!
//! ## Usage
//!
//! ```rust
//! use bakery_core::SecureRandom;
//! use bakery_store::{MemoryRootKeyStore, RootKeyStore};
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let store = MemoryRootKeyStore::new(SecureRandom::os());
//! let (id, key) = store.generate(32).await.unwrap();
//! assert_eq!(store.get(&id).await.unwrap().unwrap().as_bytes(), key.as_bytes());
//! # });
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryRootKeyStore, MemoryThirdPartyRegistry, KEY_ID_LEN};
pub use traits::{RootKeyStore, ThirdPartyRegistry};
