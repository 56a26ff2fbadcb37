//! # Well Types Library
//!
//! Shared numeric and identity types for Well pumps.
//!
//! ## Design Philosophy
//!
//! - **Log-Domain Arithmetic**: Reserves are tracked as base-2 logarithms in
//!   IEEE binary128 so geometric averages reduce to arithmetic on logs
//! - **Deterministic**: Pure software arithmetic, truncating toward zero, so
//!   every replay of an update produces bit-identical state
//! - **Explicit Failure**: Every fallible operation returns [`MathResult`];
//!   infinities and NaNs are rejected rather than propagated
//! - **Type Safety**: Distinct address types prevent mixing Well and token identities
//!
//! ## Quick Start
//!
//! ```rust
//! use well_types::Quad;
//!
//! let reserve = 10_000_000_000_000_000u128;
//! let log = Quad::log2_of_u128(reserve).unwrap();
//! let restored = log.pow2_to_u128().unwrap();
//! assert!(restored.abs_diff(reserve) <= 1);
//!
//! // Geometric mean of 4 and 16 is 8
//! let mean = Quad::log2_of_u128(4).unwrap()
//!     .checked_add(Quad::log2_of_u128(16).unwrap()).unwrap()
//!     .checked_div(Quad::TWO).unwrap();
//! assert_eq!(mean.pow2_to_u128().unwrap(), 8);
//! ```
//!
//! ## Integration Points
//!
//! - **well-codec**: Persists [`Quad`] values as 16-byte big-endian halves of storage words
//! - **well-config**: Converts decimal configuration into [`Quad`] parameters
//! - **well-amm**: Runs reserve capping and EMA/cumulative updates on [`Quad`] logs

#[cfg(feature = "common")]
pub mod common;

// Re-export common types for convenience
#[cfg(feature = "common")]
pub use common::errors::{MathError, MathResult};
#[cfg(feature = "common")]
pub use common::quad::Quad;

// Re-export common identifier types
#[cfg(feature = "common")]
pub use common::identifiers::{IdentifierError, TokenAddress, WellAddress};
