//! # Bakery Testkit
//!
//! Testing utilities for the bakery.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known signature chains with expected outputs
//! - **Generators**: Proptest strategies for conditions and caveats
//! - **Fixtures**: A three-party setup (target service, first-party
//!   discharger, authorization service) wired through one registry and one
//!   in-memory discharge network
//!
//! ## Golden Vectors
//!
//! ```rust
//! use bakery_testkit::vectors::{all_vectors, compute_signature};
//!
//! for vector in all_vectors() {
//!     assert_eq!(compute_signature(&vector), vector.expected_signature, "{}", vector.name);
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use bakery_testkit::fixtures::ThreePartyFixture;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fixture = ThreePartyFixture::new().await;
//! let token = fixture.target.mint(&[]).await.unwrap();
//! fixture.target.verify(&[token], &[]).await.unwrap();
//! # }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{init_tracing, ThreePartyFixture, AUTH_LOCATION, DISCHARGER_LOCATION, TARGET_LOCATION};
pub use generators::{condition, operator};
pub use vectors::{all_vectors, compute_signature, GoldenVector};
