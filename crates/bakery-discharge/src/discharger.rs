//! The two sides of a discharge exchange.
//!
//! A [`Discharger`] is what a token holder uses to obtain discharge tokens:
//! usually a client for the authority at the caveat location, often a plain
//! closure in tests. A [`DischargeAuthority`] is what answers such requests.

use std::future::Future;

use async_trait::async_trait;

use bakery_core::{Macaroon, ThirdPartyCaveat};

use crate::error::Result;
use crate::messages::{DischargeRequest, DischargeResponse};

/// Resolver capability: obtain an unbound discharge token for a caveat.
///
/// Implementations decide which value to present to the authority. A failed
/// call leaves nothing behind; the caveat simply stays undischarged.
#[async_trait]
pub trait Discharger: Send + Sync {
    /// Obtain a discharge token for `caveat`.
    async fn get_discharge(&self, caveat: &ThirdPartyCaveat) -> Result<Macaroon>;
}

/// A [`Discharger`] backed by an async closure.
pub struct FnDischarger<F> {
    f: F,
}

/// Adapt an async closure into a [`Discharger`].
///
/// ```rust
/// use bakery_discharge::{discharger_fn, DischargeError};
///
/// use bakery_core::Macaroon;
///
/// let refuse_all = discharger_fn(|_caveat| async { Err::<Macaroon, _>(DischargeError::Denied) });
/// # let _ = refuse_all;
/// ```
pub fn discharger_fn<F, Fut>(f: F) -> FnDischarger<F>
where
    F: Fn(ThirdPartyCaveat) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Macaroon>> + Send + 'static,
{
    FnDischarger { f }
}

#[async_trait]
impl<F, Fut> Discharger for FnDischarger<F>
where
    F: Fn(ThirdPartyCaveat) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Macaroon>> + Send + 'static,
{
    async fn get_discharge(&self, caveat: &ThirdPartyCaveat) -> Result<Macaroon> {
        (self.f)(caveat.clone()).await
    }
}

/// Server side of the discharge protocol.
#[async_trait]
pub trait DischargeAuthority: Send + Sync {
    /// Location this authority answers for.
    fn location(&self) -> &str;

    /// Answer one request. Failures are reported as a bare denial.
    async fn handle(&self, request: DischargeRequest) -> DischargeResponse;
}
