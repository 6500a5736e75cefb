//! Injected randomness.
//!
//! Every key, key id and nonce is drawn from a [`SecureRandom`] handle that
//! is passed in explicitly. There is no process-wide generator.

use std::fmt;
use std::sync::{Arc, Mutex};

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};

/// A cloneable handle to a cryptographically secure random source.
///
/// The OS source holds no state and is safe to share between any number of
/// concurrent callers. The seeded source serializes access through a mutex;
/// clones share the same stream.
#[derive(Clone)]
pub struct SecureRandom {
    source: Source,
}

#[derive(Clone)]
enum Source {
    Os,
    Seeded(Arc<Mutex<StdRng>>),
}

impl SecureRandom {
    /// Draw from the operating system CSPRNG.
    pub fn os() -> Self {
        Self { source: Source::Os }
    }

    /// Deterministic source for tests and simulations.
    pub fn seeded(seed: [u8; 32]) -> Self {
        Self {
            source: Source::Seeded(Arc::new(Mutex::new(StdRng::from_seed(seed)))),
        }
    }

    /// Whether this handle produces a reproducible stream.
    pub fn is_deterministic(&self) -> bool {
        matches!(self.source, Source::Seeded(_))
    }

    /// Fill `dest` with random bytes.
    pub fn fill_bytes(&self, dest: &mut [u8]) {
        match &self.source {
            Source::Os => OsRng.fill_bytes(dest),
            Source::Seeded(rng) => {
                // A panic elsewhere cannot leave the generator half-written.
                let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                rng.fill_bytes(dest);
            }
        }
    }

    /// Fixed-size random array.
    pub fn bytes<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        self.fill_bytes(&mut out);
        out
    }

    /// Random vector of `len` bytes.
    pub fn vec(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        self.fill_bytes(&mut out);
        out
    }
}

impl Default for SecureRandom {
    fn default() -> Self {
        Self::os()
    }
}

impl fmt::Debug for SecureRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            Source::Os => write!(f, "SecureRandom(os)"),
            Source::Seeded(_) => write!(f, "SecureRandom(seeded)"),
        }
    }
}
