//! First-party caveat checks.

use std::fmt;
use std::sync::Arc;

use crate::condition::Condition;

/// A check applied to first-party conditions during verification.
///
/// A caveat is satisfied when any verifier in play accepts it.
#[derive(Clone)]
pub struct CaveatVerifier {
    check: Arc<dyn Fn(&Condition) -> bool + Send + Sync>,
}

impl CaveatVerifier {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Condition) -> bool + Send + Sync + 'static,
    {
        Self {
            check: Arc::new(check),
        }
    }

    /// Accept exactly the condition whose canonical text is `text`.
    pub fn exact(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |condition| condition.to_string() == text)
    }

    /// Accept conditions on `key` that `candidate` satisfies.
    pub fn satisfied_by(key: impl Into<String>, candidate: impl Into<String>) -> Self {
        let key = key.into();
        let candidate = candidate.into();
        Self::new(move |condition| condition.key() == key && condition.is_satisfied_by(&candidate))
    }

    pub fn verify(&self, condition: &Condition) -> bool {
        (self.check)(condition)
    }
}

impl fmt::Debug for CaveatVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CaveatVerifier")
    }
}
