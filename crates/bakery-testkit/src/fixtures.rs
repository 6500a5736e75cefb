//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::{Arc, Once};

use bakery::{Bakery, BakeryConfig};
use bakery_core::SecureRandom;
use bakery_discharge::MemoryDischargeNetwork;
use bakery_seal::KeyPair;
use bakery_store::{MemoryRootKeyStore, MemoryThirdPartyRegistry};

/// The service whose tokens are being checked.
pub const TARGET_LOCATION: &str = "https://ts.example";
/// The first-party discharger for the target service.
pub const DISCHARGER_LOCATION: &str = "https://fs.example";
/// The authorization service third-party caveats are delegated to.
pub const AUTH_LOCATION: &str = "https://as.example";

/// Three bakeries sharing one registry and one discharge network.
///
/// Every bakery holds its own key pair in the registry and is registered on
/// the network as the authority for its location. All randomness comes
/// from one seeded source, so a fixture built with the same seed produces
/// the same keys.
pub struct ThreePartyFixture {
    pub target: Arc<Bakery>,
    pub discharger: Arc<Bakery>,
    pub auth: Arc<Bakery>,
    pub registry: Arc<MemoryThirdPartyRegistry>,
    pub network: Arc<MemoryDischargeNetwork>,
    pub rng: SecureRandom,
}

impl ThreePartyFixture {
    /// Create a fixture with a fixed seed.
    pub async fn new() -> Self {
        Self::with_seed([0x42; 32]).await
    }

    /// Create a fixture seeded deterministically.
    pub async fn with_seed(seed: [u8; 32]) -> Self {
        let rng = SecureRandom::seeded(seed);
        let registry = Arc::new(MemoryThirdPartyRegistry::new());
        let network = MemoryDischargeNetwork::new();

        let target = party(TARGET_LOCATION, &rng, &registry, &network).await;
        let discharger = party(DISCHARGER_LOCATION, &rng, &registry, &network).await;
        let auth = party(AUTH_LOCATION, &rng, &registry, &network).await;

        Self {
            target,
            discharger,
            auth,
            registry,
            network,
            rng,
        }
    }
}

/// A bakery at `location` with a fresh key pair, registered on `network`.
async fn party(
    location: &str,
    rng: &SecureRandom,
    registry: &Arc<MemoryThirdPartyRegistry>,
    network: &Arc<MemoryDischargeNetwork>,
) -> Arc<Bakery> {
    registry
        .insert_key_pair(location, KeyPair::generate(rng))
        .expect("registry lock poisoned");

    let mut config = BakeryConfig::new(
        location,
        Arc::new(MemoryRootKeyStore::new(rng.clone())),
        registry.clone(),
    );
    config.rng = rng.clone();

    let bakery = Arc::new(Bakery::new(config));
    network.register(bakery.clone()).await;
    bakery
}

static TRACING: Once = Once::new();

/// Install a test subscriber honoring `RUST_LOG`. Safe to call repeatedly.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
