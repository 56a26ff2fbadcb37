//! Well pricing functions
//!
//! A Well function relates a Well's reserves to its LP token supply. Swaps
//! and single-sided liquidity solve it for one reserve while holding the
//! supply fixed.

use anyhow::{bail, Result};
use primitive_types::U256;

/// Pricing invariant of a Well
pub trait WellFunction {
    /// LP token supply implied by `reserves`
    fn calc_lp_token_supply(&self, reserves: &[u128]) -> Result<u128>;

    /// Reserve `j` that keeps `lp_token_supply` with the other reserves fixed
    fn calc_reserve(&self, reserves: &[u128], j: usize, lp_token_supply: u128) -> Result<u128>;

    fn name(&self) -> &str;

    fn symbol(&self) -> &str;
}

/// Two-token constant product: `lp = √(r0 · r1)`
///
/// Products are taken in 256 bits, so any pair of u128 reserves is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantProduct2;

impl ConstantProduct2 {
    fn check_reserves(reserves: &[u128]) -> Result<()> {
        if reserves.len() != 2 {
            bail!(
                "Constant product takes exactly 2 reserves, got {}",
                reserves.len()
            );
        }
        Ok(())
    }
}

impl WellFunction for ConstantProduct2 {
    fn calc_lp_token_supply(&self, reserves: &[u128]) -> Result<u128> {
        Self::check_reserves(reserves)?;
        let product = U256::from(reserves[0]) * U256::from(reserves[1]);
        // √(u128::MAX²) still fits in u128
        Ok(product.integer_sqrt().low_u128())
    }

    /// Smallest reserve `j` whose product with the other reserve reaches `lp²`
    fn calc_reserve(&self, reserves: &[u128], j: usize, lp_token_supply: u128) -> Result<u128> {
        Self::check_reserves(reserves)?;
        if j > 1 {
            bail!("Reserve index {} out of range for 2 tokens", j);
        }
        let other = U256::from(reserves[1 - j]);
        if other.is_zero() {
            bail!("Counter reserve must be positive");
        }
        let target = U256::from(lp_token_supply) * U256::from(lp_token_supply);
        let (quotient, remainder) = target.div_mod(other);
        let reserve = if remainder.is_zero() {
            quotient
        } else {
            quotient + U256::one()
        };
        to_u128(reserve)
    }

    fn name(&self) -> &str {
        "Constant Product 2"
    }

    fn symbol(&self) -> &str {
        "CP2"
    }
}

fn to_u128(value: U256) -> Result<u128> {
    if value.bits() > 128 {
        bail!("Reserve {} exceeds u128", value);
    }
    Ok(value.low_u128())
}
