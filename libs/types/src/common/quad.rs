//! Quadruple-precision binary floating point for log-domain reserve math
//!
//! [`Quad`] stores an IEEE-754 binary128 bit pattern: 1 sign bit, 15 exponent
//! bits (bias 16383) and 112 fraction bits with an implicit leading one, i.e. a
//! 113-bit significand. The 16-byte big-endian form of the bit pattern is the
//! storage format used by the pump codec.
//!
//! ## Design Principles
//!
//! - **Deterministic**: every operation is pure integer arithmetic and truncates
//!   toward zero, so results are bit-identical on every platform
//! - **Finite only**: infinity and NaN encodings are rejected with
//!   [`MathError::NotFinite`]; exponent overflow is [`MathError::Overflow`]
//! - **Checked**: all arithmetic returns [`MathResult`] and never clamps silently
//! - **Gradual underflow**: tiny results flush through subnormals to zero
//!
//! ## Example
//!
//! ```rust
//! use well_types::Quad;
//!
//! let a = Quad::from_u128(3);
//! let b = Quad::from_u128(4);
//! let product = a.checked_mul(b).unwrap();
//! assert_eq!(product.to_u128().unwrap(), 12);
//! ```

use super::errors::{MathError, MathResult};
use primitive_types::U256;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

const SIGN_MASK: u128 = 1 << 127;
const EXPONENT_MASK: u128 = 0x7FFF << 112;
const FRACTION_MASK: u128 = (1 << 112) - 1;
const IMPLICIT_BIT: u128 = 1 << 112;

/// Position of the implicit bit inside the significand
const SIGNIFICAND_MSB: i32 = 112;
const EXPONENT_BIAS: i32 = 16383;
const MAX_BIASED_EXPONENT: i32 = 0x7FFF;

/// Difference between the biased exponent field and the exponent applied to
/// the integer significand: `value = significand * 2^(biased - SIGNIFICAND_OFFSET)`
const SIGNIFICAND_OFFSET: i32 = EXPONENT_BIAS + SIGNIFICAND_MSB;

/// Extra low bits kept while aligning addends
const GUARD_BITS: i32 = 14;

/// Quotient bits produced below the binary point by long division
const DIVISION_BITS: i32 = 120;

/// Quadruple-precision (binary128) floating-point value
#[derive(Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quad(u128);

/// Sign, exponent and integer significand of a finite `Quad`
///
/// value = (-1)^negative * significand * 2^exponent, with the significand
/// normalized to `[2^112, 2^113)` or equal to zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Unpacked {
    pub(crate) negative: bool,
    pub(crate) exponent: i32,
    pub(crate) significand: u128,
}

impl Quad {
    /// Positive zero
    pub const ZERO: Self = Self(0);

    /// One (1.0)
    pub const ONE: Self = Self((EXPONENT_BIAS as u128) << 112);

    /// Two (2.0)
    pub const TWO: Self = Self(((EXPONENT_BIAS + 1) as u128) << 112);

    /// One half (0.5)
    pub const HALF: Self = Self(((EXPONENT_BIAS - 1) as u128) << 112);

    /// Wrap a raw binary128 bit pattern
    #[inline]
    pub const fn from_bits(bits: u128) -> Self {
        Self(bits)
    }

    /// Raw binary128 bit pattern
    #[inline]
    pub const fn to_bits(self) -> u128 {
        self.0
    }

    /// Decode from the 16-byte big-endian storage form
    #[inline]
    pub const fn from_be_bytes(bytes: [u8; 16]) -> Self {
        Self(u128::from_be_bytes(bytes))
    }

    /// Encode into the 16-byte big-endian storage form
    #[inline]
    pub const fn to_be_bytes(self) -> [u8; 16] {
        self.0.to_be_bytes()
    }

    /// Exact for values below 2^113, truncated toward zero above
    pub const fn from_u128(value: u128) -> Self {
        if value == 0 {
            return Self::ZERO;
        }
        let msb = 127 - value.leading_zeros() as i32;
        let significand = if msb > SIGNIFICAND_MSB {
            value >> (msb - SIGNIFICAND_MSB)
        } else {
            value << (SIGNIFICAND_MSB - msb)
        };
        let biased = (msb + EXPONENT_BIAS) as u128;
        Self((biased << 112) | (significand & FRACTION_MASK))
    }

    /// Signed counterpart of [`Quad::from_u128`]
    pub const fn from_i128(value: i128) -> Self {
        let magnitude = Self::from_u128(value.unsigned_abs());
        if value < 0 {
            Self(magnitude.0 | SIGN_MASK)
        } else {
            magnitude
        }
    }

    /// Convert to an unsigned integer, truncating toward zero
    ///
    /// Magnitudes below one (of either sign) map to 0, matching the behaviour
    /// expected when exponentiating very negative log values.
    pub fn to_u128(self) -> MathResult<u128> {
        let u = self.unpack()?;
        if u.significand == 0 {
            return Ok(0);
        }
        let integer = if u.exponent < 0 {
            u.significand
                .checked_shr(u.exponent.unsigned_abs())
                .unwrap_or(0)
        } else {
            // 113 significant bits shifted by at most 15 still fit in 128 bits
            if u.exponent > 127 - SIGNIFICAND_MSB {
                return Err(MathError::Overflow);
            }
            u.significand << u.exponent
        };
        if integer != 0 && u.negative {
            return Err(MathError::NegativeToUnsigned);
        }
        Ok(integer)
    }

    /// Approximate value as `f64` for logging and display
    pub fn to_f64(self) -> f64 {
        match self.unpack() {
            Ok(u) if u.significand != 0 => {
                // Top 53 bits are exact in an f64 mantissa
                let magnitude = (u.significand >> 60) as f64 * 2f64.powi(u.exponent + 60);
                if u.negative {
                    -magnitude
                } else {
                    magnitude
                }
            }
            Ok(_) => 0.0,
            Err(_) => f64::NAN,
        }
    }

    /// True for +0 and -0
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 & !SIGN_MASK == 0
    }

    /// True when the sign bit is set and the value is not zero
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 & SIGN_MASK != 0 && !self.is_zero()
    }

    /// True unless the exponent field encodes infinity or NaN
    #[inline]
    pub const fn is_finite(self) -> bool {
        self.0 & EXPONENT_MASK != EXPONENT_MASK
    }

    /// Absolute value
    #[inline]
    pub const fn abs(self) -> Self {
        Self(self.0 & !SIGN_MASK)
    }

    /// Checked addition
    pub fn checked_add(self, rhs: Self) -> MathResult<Self> {
        let a = self.unpack()?;
        let b = rhs.unpack()?;
        if a.significand == 0 {
            return Ok(rhs);
        }
        if b.significand == 0 {
            return Ok(self);
        }

        let (big, small) = if a.exponent >= b.exponent { (a, b) } else { (b, a) };
        let exponent = big.exponent - GUARD_BITS;
        let big_sig = big.significand << GUARD_BITS;
        let small_sig = (small.significand << GUARD_BITS)
            .checked_shr((big.exponent - small.exponent) as u32)
            .unwrap_or(0);

        if big.negative == small.negative {
            // both below 2^127, so the sum fits
            pack(big.negative, exponent, big_sig + small_sig)
        } else if big_sig >= small_sig {
            pack(big.negative, exponent, big_sig - small_sig)
        } else {
            pack(small.negative, exponent, small_sig - big_sig)
        }
    }

    /// Checked subtraction
    #[inline]
    pub fn checked_sub(self, rhs: Self) -> MathResult<Self> {
        self.checked_add(-rhs)
    }

    /// Checked multiplication
    pub fn checked_mul(self, rhs: Self) -> MathResult<Self> {
        let a = self.unpack()?;
        let b = rhs.unpack()?;
        if a.significand == 0 || b.significand == 0 {
            return Ok(Self::ZERO);
        }
        let negative = a.negative != b.negative;
        let exponent = a.exponent + b.exponent;

        let (hi, lo) = widening_mul(a.significand, b.significand);
        if hi == 0 {
            return pack(negative, exponent, lo);
        }
        // Keep the top 128 bits of the (at most 226-bit) product
        let shift = 128 - hi.leading_zeros();
        let significand = (hi << (128 - shift)) | (lo >> shift);
        pack(negative, exponent + shift as i32, significand)
    }

    /// Checked division
    pub fn checked_div(self, rhs: Self) -> MathResult<Self> {
        let a = self.unpack()?;
        let b = rhs.unpack()?;
        if b.significand == 0 {
            return Err(MathError::DivisionByZero);
        }
        if a.significand == 0 {
            return Ok(Self::ZERO);
        }

        // Restoring long division; both significands are normalized so the
        // integer part of the quotient is 0 or 1.
        let mut quotient = a.significand / b.significand;
        let mut remainder = a.significand % b.significand;
        for _ in 0..DIVISION_BITS {
            remainder <<= 1;
            quotient <<= 1;
            if remainder >= b.significand {
                remainder -= b.significand;
                quotient |= 1;
            }
        }
        pack(
            a.negative != b.negative,
            a.exponent - b.exponent - DIVISION_BITS,
            quotient,
        )
    }

    /// Integer power by square-and-multiply
    ///
    /// `x.powu(0)` is one for every finite `x`.
    pub fn powu(self, exponent: u64) -> MathResult<Self> {
        let mut base = self;
        let mut remaining = exponent;
        let mut result = Self::ONE;
        while remaining > 0 {
            if remaining & 1 == 1 {
                result = result.checked_mul(base)?;
            }
            remaining >>= 1;
            if remaining > 0 {
                base = base.checked_mul(base)?;
            }
        }
        Ok(result)
    }

    /// Split into sign, exponent and normalized significand
    pub(crate) fn unpack(self) -> MathResult<Unpacked> {
        let negative = self.0 & SIGN_MASK != 0;
        let biased = ((self.0 & EXPONENT_MASK) >> 112) as i32;
        let fraction = self.0 & FRACTION_MASK;
        match biased {
            MAX_BIASED_EXPONENT => Err(MathError::NotFinite),
            0 if fraction == 0 => Ok(Unpacked {
                negative,
                exponent: 0,
                significand: 0,
            }),
            0 => {
                // Subnormal: move the leading one up to the implicit position
                let shift = fraction.leading_zeros() as i32 - (127 - SIGNIFICAND_MSB);
                Ok(Unpacked {
                    negative,
                    exponent: 1 - SIGNIFICAND_OFFSET - shift,
                    significand: fraction << shift,
                })
            }
            _ => Ok(Unpacked {
                negative,
                exponent: biased - SIGNIFICAND_OFFSET,
                significand: fraction | IMPLICIT_BIT,
            }),
        }
    }

    /// Total order over finite values; +0 and -0 compare equal
    #[inline]
    fn order_key(self) -> i128 {
        let magnitude = (self.0 & !SIGN_MASK) as i128;
        if self.0 & SIGN_MASK != 0 {
            -magnitude
        } else {
            magnitude
        }
    }
}

/// Normalize an arbitrary significand and encode it, truncating extra bits
pub(crate) fn pack(negative: bool, exponent: i32, significand: u128) -> MathResult<Quad> {
    if significand == 0 {
        return Ok(Quad::ZERO);
    }
    let msb = 127 - significand.leading_zeros() as i32;
    let (mut significand, exponent) = if msb > SIGNIFICAND_MSB {
        (significand >> (msb - SIGNIFICAND_MSB), exponent + (msb - SIGNIFICAND_MSB))
    } else {
        (significand << (SIGNIFICAND_MSB - msb), exponent - (SIGNIFICAND_MSB - msb))
    };

    let mut biased = exponent + SIGNIFICAND_OFFSET;
    if biased >= MAX_BIASED_EXPONENT {
        return Err(MathError::Overflow);
    }
    if biased <= 0 {
        significand = significand.checked_shr((1 - biased) as u32).unwrap_or(0);
        biased = 0;
        if significand == 0 {
            return Ok(Quad::ZERO);
        }
    }

    let sign = if negative { SIGN_MASK } else { 0 };
    Ok(Quad(
        sign | ((biased as u128) << 112) | (significand & FRACTION_MASK),
    ))
}

/// Full 256-bit product of two u128 values as `(high, low)`
pub(crate) fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    // (2^128 - 1)^2 < 2^256, so the product never wraps
    let (product, _) = U256::from(a).overflowing_mul(U256::from(b));
    ((product >> 128).low_u128(), product.low_u128())
}

impl Neg for Quad {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(self.0 ^ SIGN_MASK)
    }
}

impl PartialEq for Quad {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for Quad {}

impl PartialOrd for Quad {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quad {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl Hash for Quad {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl From<u128> for Quad {
    #[inline]
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl From<u64> for Quad {
    #[inline]
    fn from(value: u64) -> Self {
        Self::from_u128(u128::from(value))
    }
}

impl From<i128> for Quad {
    #[inline]
    fn from(value: i128) -> Self {
        Self::from_i128(value)
    }
}

impl fmt::Debug for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quad(0x{:032x} ≈ {:e})", self.0, self.to_f64())
    }
}

/// Display implementation for convenient logging
impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_f64())
    }
}
