//! Transports between token holders and discharge authorities.
//!
//! Production deployments put the discharge exchange behind HTTP at each
//! caveat location. The in-memory network here routes the same encoded
//! messages between authorities living in one process.

/// An in-process network of discharge authorities, for tests and
/// single-binary deployments.
pub mod memory {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::RwLock;
    use tracing::debug;

    use bakery_core::{Macaroon, ThirdPartyCaveat};

    use crate::discharger::{DischargeAuthority, Discharger};
    use crate::error::{DischargeError, Result};
    use crate::messages::{DischargeRequest, DischargeResponse};

    /// Authorities indexed by location.
    #[derive(Default)]
    pub struct MemoryDischargeNetwork {
        authorities: RwLock<HashMap<String, Arc<dyn DischargeAuthority>>>,
    }

    impl MemoryDischargeNetwork {
        /// Create an empty network.
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        /// Make `authority` reachable at its location.
        pub async fn register(&self, authority: Arc<dyn DischargeAuthority>) {
            let location = authority.location().to_string();
            debug!(%location, "registered discharge authority");
            self.authorities.write().await.insert(location, authority);
        }

        /// Take the authority at `location` offline.
        pub async fn unregister(&self, location: &str) -> bool {
            self.authorities.write().await.remove(location).is_some()
        }

        /// Deliver a request to the authority at `location`.
        ///
        /// Both messages pass through their wire encoding.
        pub async fn send(
            &self,
            location: &str,
            request: &DischargeRequest,
        ) -> Result<DischargeResponse> {
            let authority = self
                .authorities
                .read()
                .await
                .get(location)
                .cloned()
                .ok_or_else(|| DischargeError::UnknownAuthority(location.to_string()))?;

            debug!(%location, "routing discharge request");
            let request = DischargeRequest::from_bytes(&request.to_bytes()?)?;
            let response = authority.handle(request).await;
            DischargeResponse::from_bytes(&response.to_bytes()?)
        }

        /// A [`Discharger`] that presents `value` for every caveat.
        pub fn discharger(self: &Arc<Self>, value: impl Into<String>) -> NetworkDischarger {
            NetworkDischarger {
                network: Arc::clone(self),
                value: value.into(),
                timeout: None,
            }
        }
    }

    /// Client for a [`MemoryDischargeNetwork`].
    pub struct NetworkDischarger {
        network: Arc<MemoryDischargeNetwork>,
        value: String,
        timeout: Option<Duration>,
    }

    impl NetworkDischarger {
        /// Give up on an authority after `timeout`.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }
    }

    #[async_trait]
    impl Discharger for NetworkDischarger {
        async fn get_discharge(&self, caveat: &ThirdPartyCaveat) -> Result<Macaroon> {
            let request = DischargeRequest::new(caveat.clone(), self.value.clone());
            let exchange = self.network.send(&caveat.location, &request);

            let response = match self.timeout {
                Some(timeout) => tokio::time::timeout(timeout, exchange)
                    .await
                    .map_err(|_| DischargeError::Timeout(caveat.location.clone()))??,
                None => exchange.await?,
            };
            response.into_macaroon()
        }
    }
}
