//! # Bakery Discharge
//!
//! The discharge protocol between token holders and third-party authorities.
//!
//! ## Overview
//!
//! A token carrying a third-party caveat only verifies next to a discharge
//! token from the authority named in the caveat. This crate defines how a
//! holder asks for one ([`Discharger`]), how an authority answers
//! ([`DischargeAuthority`]), the messages that pass between them, and an
//! in-memory network that connects the two inside one process.
//!
//! ## Key Types
//!
//! - [`DischargeRequest`] / [`DischargeResponse`] - CBOR-encoded protocol messages
//! - [`Discharger`] - Resolver capability used during discharge resolution
//! - [`discharger_fn`] - Adapt an async closure into a [`Discharger`]
//! - [`DischargeAuthority`] - Server seam implemented by a bakery
//! - [`MemoryDischargeNetwork`] - In-process routing by caveat location
//!
//! ## Design Notes
//!
//! - **Opaque denials**: a [`DischargeResponse::Denied`] never says why.
//! - **Holder picks the value**: the discharger, not the authority, decides
//!   which value is claimed to satisfy a caveat's condition.

pub mod discharger;
pub mod error;
pub mod messages;
pub mod transport;

pub use discharger::{discharger_fn, DischargeAuthority, Discharger, FnDischarger};
pub use error::{DischargeError, Result};
pub use messages::{DischargeRequest, DischargeResponse, PROTOCOL_VERSION};
pub use transport::memory::{MemoryDischargeNetwork, NetworkDischarger};
