//! In-memory implementations of the store traits.
//!
//! Suitable for single-process deployments and tests. Everything is lost
//! when the store is dropped. Thread-safe via RwLock.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use bakery_core::{KeyId, RootKey, SecureRandom};
use bakery_seal::{KeyPair, PublicKey};

use crate::error::{Result, StoreError};
use crate::traits::{RootKeyStore, ThirdPartyRegistry};

/// Length of store-assigned key ids.
pub const KEY_ID_LEN: usize = 16;

/// In-memory root key store with optional expiry.
pub struct MemoryRootKeyStore {
    rng: SecureRandom,
    ttl: Option<Duration>,
    keys: RwLock<HashMap<KeyId, StoredKey>>,
}

struct StoredKey {
    key: RootKey,
    created_at: Instant,
}

impl MemoryRootKeyStore {
    /// Create an empty store whose keys never expire.
    pub fn new(rng: SecureRandom) -> Self {
        Self {
            rng,
            ttl: None,
            keys: RwLock::new(HashMap::new()),
        }
    }

    /// Expire keys `ttl` after allocation. Expired keys are dropped on the next `generate`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Number of keys currently held, expired ones included.
    pub fn len(&self) -> Result<usize> {
        Ok(self.keys.read().map_err(|_| StoreError::Poisoned)?.len())
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Drop every expired key.
    pub fn purge_expired(&self) -> Result<usize> {
        let Some(ttl) = self.ttl else {
            return Ok(0);
        };
        let mut keys = self.keys.write().map_err(|_| StoreError::Poisoned)?;
        let before = keys.len();
        keys.retain(|_, stored| stored.created_at.elapsed() < ttl);
        Ok(before - keys.len())
    }

    fn is_live(&self, stored: &StoredKey) -> bool {
        match self.ttl {
            Some(ttl) => stored.created_at.elapsed() < ttl,
            None => true,
        }
    }
}

impl Default for MemoryRootKeyStore {
    fn default() -> Self {
        Self::new(SecureRandom::os())
    }
}

#[async_trait]
impl RootKeyStore for MemoryRootKeyStore {
    async fn generate(&self, size: usize) -> Result<(KeyId, RootKey)> {
        let key = RootKey::from_bytes(self.rng.vec(size));
        let mut keys = self.keys.write().map_err(|_| StoreError::Poisoned)?;
        if let Some(ttl) = self.ttl {
            keys.retain(|_, stored| stored.created_at.elapsed() < ttl);
        }

        let id = loop {
            let candidate = KeyId::from_bytes(self.rng.vec(KEY_ID_LEN));
            if !keys.contains_key(&candidate) {
                break candidate;
            }
        };

        keys.insert(
            id.clone(),
            StoredKey {
                key: key.clone(),
                created_at: Instant::now(),
            },
        );
        debug!(key_id = %id, "allocated root key");
        Ok((id, key))
    }

    async fn get(&self, id: &KeyId) -> Result<Option<RootKey>> {
        let keys = self.keys.read().map_err(|_| StoreError::Poisoned)?;
        Ok(keys
            .get(id)
            .filter(|stored| self.is_live(stored))
            .map(|stored| stored.key.clone()))
    }

    async fn remove(&self, id: &KeyId) -> Result<bool> {
        let mut keys = self.keys.write().map_err(|_| StoreError::Poisoned)?;
        let existed = keys.remove(id).is_some();
        if existed {
            debug!(key_id = %id, "removed root key");
        }
        Ok(existed)
    }
}

/// In-memory registry of discharge authorities.
#[derive(Default)]
pub struct MemoryThirdPartyRegistry {
    entries: RwLock<HashMap<String, Entry>>,
}

enum Entry {
    Remote(PublicKey),
    Local(KeyPair),
}

impl MemoryThirdPartyRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the public key of a remote authority.
    ///
    /// Replaces any earlier entry for `location`, local key pairs included.
    pub fn insert_public_key(&self, location: impl Into<String>, key: PublicKey) -> Result<()> {
        let location = location.into();
        debug!(%location, key = ?key, "registered authority public key");
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(location, Entry::Remote(key));
        Ok(())
    }

    /// Register this node as the authority at `location`.
    pub fn insert_key_pair(&self, location: impl Into<String>, pair: KeyPair) -> Result<()> {
        let location = location.into();
        debug!(%location, key = ?pair.public(), "registered local authority key pair");
        self.entries
            .write()
            .map_err(|_| StoreError::Poisoned)?
            .insert(location, Entry::Local(pair));
        Ok(())
    }
}

#[async_trait]
impl ThirdPartyRegistry for MemoryThirdPartyRegistry {
    async fn public_key_for(&self, location: &str) -> Result<Option<PublicKey>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(location).map(|entry| match entry {
            Entry::Remote(key) => *key,
            Entry::Local(pair) => *pair.public(),
        }))
    }

    async fn private_key_for(&self, location: &str) -> Result<Option<KeyPair>> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(match entries.get(location) {
            Some(Entry::Local(pair)) => Some(pair.clone()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_generate_and_get() {
        let store = MemoryRootKeyStore::new(SecureRandom::seeded([1; 32]));
        let (id, key) = store.generate(32).await.unwrap();

        assert_eq!(id.as_bytes().len(), KEY_ID_LEN);
        assert_eq!(key.len(), 32);

        let fetched = store.get(&id).await.unwrap().unwrap();
        assert_eq!(fetched.as_bytes(), key.as_bytes());
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = MemoryRootKeyStore::default();
        let missing = KeyId::from_bytes(vec![0; KEY_ID_LEN]);
        assert!(store.get(&missing).await.unwrap().is_none());
        assert!(!store.remove(&missing).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemoryRootKeyStore::default();
        let (id, _) = store.generate(32).await.unwrap();

        assert!(store.remove(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryRootKeyStore::default().with_ttl(Duration::from_millis(20));
        let (id, _) = store.generate(32).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(40)).await;

        assert!(store.get(&id).await.unwrap().is_none());
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.purge_expired().unwrap(), 1);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_generate_drops_expired_keys() {
        let store = MemoryRootKeyStore::default().with_ttl(Duration::from_millis(20));
        for _ in 0..3 {
            store.generate(32).await.unwrap();
        }
        assert_eq!(store.len().unwrap(), 3);

        tokio::time::sleep(Duration::from_millis(40)).await;

        let (fresh, _) = store.generate(32).await.unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&fresh).await.unwrap().is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_generate_yields_distinct_ids() {
        let store = Arc::new(MemoryRootKeyStore::default());
        let tasks: Vec<_> = (0..64)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.generate(32).await.unwrap() })
            })
            .collect();

        let mut ids = HashSet::new();
        for task in tasks {
            let (id, key) = task.await.unwrap();
            let fetched = store.get(&id).await.unwrap().unwrap();
            assert_eq!(fetched.as_bytes(), key.as_bytes());
            ids.insert(id);
        }
        assert_eq!(ids.len(), 64);
    }

    #[tokio::test]
    async fn test_registry_lookups() {
        let rng = SecureRandom::seeded([2; 32]);
        let remote = KeyPair::generate(&rng);
        let local = KeyPair::generate(&rng);

        let registry = MemoryThirdPartyRegistry::new();
        registry
            .insert_public_key("https://remote", *remote.public())
            .unwrap();
        registry.insert_key_pair("https://local", local.clone()).unwrap();

        assert_eq!(
            registry.public_key_for("https://remote").await.unwrap(),
            Some(*remote.public())
        );
        assert!(registry
            .private_key_for("https://remote")
            .await
            .unwrap()
            .is_none());

        assert_eq!(
            registry.public_key_for("https://local").await.unwrap(),
            Some(*local.public())
        );
        let pair = registry.private_key_for("https://local").await.unwrap().unwrap();
        assert_eq!(pair.public(), local.public());

        assert!(registry.public_key_for("https://nowhere").await.unwrap().is_none());
    }
}
