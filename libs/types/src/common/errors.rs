//! Error types for quad-precision arithmetic
//!
//! Every fallible operation on [`Quad`](crate::Quad) reports one of these
//! variants. Callers are expected to propagate them: a pump update that hits a
//! math error aborts as a whole instead of persisting a clamped value.

use thiserror::Error;

/// Errors that can occur during quad-precision arithmetic operations
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MathError {
    /// Logarithm requested for zero or a negative value
    #[error("Logarithm domain error: input must be strictly positive")]
    LogOfNonPositive,

    /// Division by zero in quad-precision arithmetic
    #[error("Division by zero in quad-precision arithmetic")]
    DivisionByZero,

    /// Result exponent exceeds the binary128 range (or 128-bit integer range on conversion)
    #[error("Overflow: result exceeds the representable range")]
    Overflow,

    /// Operand carries an infinity or NaN bit pattern
    #[error("Value is not finite: infinity and NaN encodings are not accepted")]
    NotFinite,

    /// Negative value with magnitude >= 1 converted to an unsigned integer
    #[error("Negative value cannot be converted to an unsigned integer")]
    NegativeToUnsigned,
}

/// Result type for quad-precision operations
pub type MathResult<T> = std::result::Result<T, MathError>;
