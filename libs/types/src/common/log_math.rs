//! Base-2 logarithm and exponentiation for [`Quad`]
//!
//! Both directions run on a 124-bit fixed-point significand so the result
//! carries more bits than the 113-bit quad significand it is packed into.
//!
//! - `log2` extracts the fraction bit by bit through repeated squaring of the
//!   normalized significand
//! - `pow2` splits `x` into integer and fraction, evaluates `2^f = e^(f·ln 2)`
//!   with a Taylor series and rescales by `2^n`
//!
//! `pow2(log2(x))` reproduces `x` to within a few units in the last place.

use super::errors::{MathError, MathResult};
use super::quad::{pack, widening_mul, Quad};

const FIXED_BITS: u32 = 124;
const FIXED_ONE: u128 = 1 << FIXED_BITS;

/// |x| at or above 2^14 saturates `pow2`
const POW2_LIMIT_LOG: i32 = 14;

/// ln 2 with 124 fractional bits
const LN2_FIXED: u128 = ln2_fixed();

/// ln 2 = Σ 1 / (k · 2^k), evaluated with 127 fractional bits then rounded to 124
const fn ln2_fixed() -> u128 {
    const WIDE_BITS: u32 = 127;
    let mut sum: u128 = 0;
    let mut k: u32 = 1;
    while k <= WIDE_BITS {
        sum += (1u128 << (WIDE_BITS - k)) / k as u128;
        k += 1;
    }
    let shift = WIDE_BITS - FIXED_BITS;
    (sum + (1 << (shift - 1))) >> shift
}

/// Fixed-point product; both operands must stay below 2^126
#[inline]
fn mul_fixed(a: u128, b: u128) -> u128 {
    let (hi, lo) = widening_mul(a, b);
    (hi << (128 - FIXED_BITS)) | (lo >> FIXED_BITS)
}

/// 2^f for a fraction `f` in [0, 1), both in 124-bit fixed point
fn exp2_fixed(fraction: u128) -> u128 {
    let y = mul_fixed(fraction, LN2_FIXED);
    let mut sum = FIXED_ONE;
    let mut term = FIXED_ONE;
    let mut k: u128 = 1;
    // y < ln 2, so terms shrink geometrically and reach zero after ~40 steps
    while term != 0 {
        term = mul_fixed(term, y) / k;
        sum += term;
        k += 1;
    }
    sum
}

impl Quad {
    /// Base-2 logarithm
    ///
    /// Returns [`MathError::LogOfNonPositive`] for zero and negative inputs.
    pub fn log2(self) -> MathResult<Quad> {
        let u = self.unpack()?;
        if u.negative || u.significand == 0 {
            return Err(MathError::LogOfNonPositive);
        }

        // value = m · 2^integer with m in [1, 2)
        let integer = u.exponent + 112;
        let mut m = u.significand << (FIXED_BITS - 112);
        let mut fraction: u128 = 0;
        for bit in (0..FIXED_BITS).rev() {
            m = mul_fixed(m, m);
            if m >= FIXED_ONE << 1 {
                m >>= 1;
                fraction |= 1 << bit;
            }
        }

        let fractional = pack(false, -(FIXED_BITS as i32), fraction)?;
        Quad::from_i128(i128::from(integer)).checked_add(fractional)
    }

    /// Two raised to `self`
    ///
    /// Inputs at or below -16384 underflow to zero; inputs at or above 16384
    /// return [`MathError::Overflow`].
    pub fn pow2(self) -> MathResult<Quad> {
        let u = self.unpack()?;
        if u.significand == 0 {
            return Ok(Quad::ONE);
        }
        if u.exponent + 112 >= POW2_LIMIT_LOG {
            return if u.negative {
                Ok(Quad::ZERO)
            } else {
                Err(MathError::Overflow)
            };
        }

        // |x| < 2^14 implies the binary point sits more than 98 bits up
        let shift = u.exponent.unsigned_abs();
        let integer = u.significand.checked_shr(shift).unwrap_or(0);
        let remainder = if shift >= 128 {
            u.significand
        } else {
            u.significand & ((1u128 << shift) - 1)
        };
        let mut fraction = if shift >= FIXED_BITS {
            remainder.checked_shr(shift - FIXED_BITS).unwrap_or(0)
        } else {
            remainder << (FIXED_BITS - shift)
        };

        let mut integer = integer as i32;
        if u.negative {
            // -(i + f) = -(i + 1) + (1 - f)
            integer = -integer;
            if fraction != 0 {
                integer -= 1;
                fraction = FIXED_ONE - fraction;
            }
        }

        pack(false, integer - FIXED_BITS as i32, exp2_fixed(fraction))
    }

    /// Log2 of an unsigned integer amount
    #[inline]
    pub fn log2_of_u128(value: u128) -> MathResult<Quad> {
        Quad::from_u128(value).log2()
    }

    /// Exponentiate a log2 value back to an unsigned integer amount
    #[inline]
    pub fn pow2_to_u128(self) -> MathResult<u128> {
        self.pow2()?.to_u128()
    }

    /// Exact `mantissa / 10^scale` of a decimal, in quad precision
    #[cfg(feature = "rust_decimal")]
    pub fn from_decimal(value: rust_decimal::Decimal) -> MathResult<Quad> {
        let numerator = Quad::from_i128(value.mantissa());
        let denominator = Quad::from_u128(10u128.pow(value.scale()));
        numerator.checked_div(denominator)
    }
}
