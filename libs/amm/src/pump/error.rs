//! Pump errors
//!
//! Any error aborts the whole update: nothing is persisted for the Well.

use thiserror::Error;
use well_codec::CodecError;
use well_config::ConfigValidationError;
use well_types::MathError;

/// Errors raised by pump updates and reads
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PumpError {
    /// Log-domain arithmetic failed
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Persisted layout could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Reserve array length differs from the count fixed at initialization
    #[error("Reserve count mismatch: pump tracks {expected} reserves, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    /// More reserves than a pump can persist
    #[error("Too many reserves: {count} exceeds the limit of {max}")]
    TooManyReserves { count: usize, max: usize },

    /// Update called without reserves
    #[error("Empty reserves: an update needs at least one reserve")]
    EmptyReserves,

    /// Time-weighted average requested over an empty window
    #[error("No time passed: window starts at {start_timestamp}, now is {now}")]
    NoTimePassed { start_timestamp: u64, now: u64 },

    /// Attach requested for an unsupported token count
    #[error("Invalid reserve count {0}: pumps track between 1 and 8 reserves")]
    InvalidReserveCount(usize),

    /// Pump parameters failed validation
    #[error("Invalid pump configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),
}

/// Result type for pump operations
pub type PumpResult<T> = std::result::Result<T, PumpError>;
