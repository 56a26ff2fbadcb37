//! Codec-level errors for persisted pump layouts
//!
//! Each variant carries enough context to tell a corrupted slot region apart
//! from a caller passing an oversized or empty reserve set.

use thiserror::Error;

/// Layout violations while encoding or decoding packed storage
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// More values than a packed region may hold
    #[error("Too many values: {count} exceeds the packed limit of {max}")]
    TooManyValues { count: usize, max: usize },

    /// A header requires at least one value
    #[error("Empty value set: the last-reserves header needs at least one value")]
    EmptyValues,

    /// Timestamp does not fit the 40-bit header field
    #[error("Timestamp {timestamp} does not fit in 40 bits (max {max})")]
    TimestampOverflow { timestamp: u64, max: u64 },

    /// Decoded word buffer is shorter than the declared count requires
    #[error("Truncated region: {count} values need {need} words, got {got}")]
    TruncatedRegion { count: usize, need: usize, got: usize },

    /// Opaque cumulative snapshot has the wrong shape
    #[error("Malformed snapshot: {len} bytes (declared count {declared}, expected {expected} bytes)")]
    MalformedSnapshot {
        len: usize,
        declared: usize,
        expected: usize,
    },
}

impl CodecError {
    /// Create TooManyValues against the packed limit
    pub fn too_many(count: usize) -> Self {
        Self::TooManyValues {
            count,
            max: crate::MAX_VALUES,
        }
    }

    /// Create MalformedSnapshot for a buffer of `len` bytes
    pub fn malformed_snapshot(len: usize, declared: usize) -> Self {
        Self::MalformedSnapshot {
            len,
            declared,
            expected: crate::snapshot::snapshot_len(declared),
        }
    }
}

/// Result type for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;
