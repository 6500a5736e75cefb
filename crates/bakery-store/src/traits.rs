//! Store traits: the abstract interfaces for key lookup and allocation.
//!
//! The bakery only talks to these traits. Implementations include the
//! in-memory stores in this crate; a persistent or distributed backend plugs
//! in without API changes.

use async_trait::async_trait;
use bakery_core::{KeyId, RootKey};
use bakery_seal::{KeyPair, PublicKey};

use crate::error::Result;

/// Storage for the symmetric root keys that tokens are minted under.
///
/// # Design Notes
///
/// - **Store-assigned ids**: `generate` picks the key id, callers never do.
/// - **Immutable entries**: a key is never changed after allocation.
/// - **Expiry is a store policy**: `get` returns `None` for keys the store
///   has expired or removed, and the bakery treats both as unknown.
#[async_trait]
pub trait RootKeyStore: Send + Sync {
    /// Allocate and persist a fresh random root key of `size` bytes.
    async fn generate(&self, size: usize) -> Result<(KeyId, RootKey)>;

    /// Look up a root key. `None` if unknown or expired.
    async fn get(&self, id: &KeyId) -> Result<Option<RootKey>>;

    /// Forget a root key. Every token minted under it stops verifying.
    ///
    /// Returns whether the key existed.
    async fn remove(&self, id: &KeyId) -> Result<bool>;
}

/// Directory of discharge authorities by location.
#[async_trait]
pub trait ThirdPartyRegistry: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Public key of the authority at `location`.
    async fn public_key_for(&self, location: &str) -> Result<Option<PublicKey>>;

    /// Full key pair for `location`, present only when this node is that
    /// authority.
    async fn private_key_for(&self, location: &str) -> Result<Option<KeyPair>>;
}
