//! Per-block reserve capping in log space
//!
//! A reserve may move by at most a fixed ratio per elapsed block. In log2
//! space that ratio becomes an additive step, so `n` blocks allow
//! `n × log2(1 + increase)` upward and `n × log2(1 − decrease)` downward.

use rust_decimal::Decimal;
use tracing::trace;
use well_config::PumpConfig;
use well_types::{MathResult, Quad};

use super::error::PumpResult;

/// Pump parameters converted to log-domain quads, computed once per pump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpParams {
    /// `log2(1 + max_percent_increase)`, non-negative
    pub log_max_increase: Quad,
    /// `log2(1 − max_percent_decrease)`, non-positive
    pub log_max_decrease: Quad,
    /// Seconds per block
    pub block_time: u64,
    /// EMA decay per second
    pub alpha: Quad,
}

impl PumpParams {
    /// Validate a configuration and precompute its log bounds
    pub fn from_config(config: &PumpConfig) -> PumpResult<Self> {
        config.validate()?;
        Ok(Self {
            log_max_increase: log_bound(Decimal::ONE + config.max_percent_increase)?,
            log_max_decrease: log_bound(Decimal::ONE - config.max_percent_decrease)?,
            block_time: config.block_time,
            alpha: Quad::from_decimal(config.alpha)?,
        })
    }

    /// Cap `observed` against `last` for this pump's bounds
    #[inline]
    pub fn cap(&self, last: Quad, observed: Quad, blocks_passed: u64) -> MathResult<Quad> {
        cap_reserve(
            last,
            observed,
            blocks_passed,
            self.log_max_increase,
            self.log_max_decrease,
        )
    }
}

fn log_bound(ratio: Decimal) -> MathResult<Quad> {
    Quad::from_decimal(ratio)?.log2()
}

/// Clamp a log reserve to the band reachable from `last` in `blocks_passed` blocks
///
/// With no block elapsed the reserve cannot move at all.
pub fn cap_reserve(
    last: Quad,
    observed: Quad,
    blocks_passed: u64,
    log_max_increase: Quad,
    log_max_decrease: Quad,
) -> MathResult<Quad> {
    if blocks_passed == 0 {
        return Ok(last);
    }
    let blocks = Quad::from(blocks_passed);

    let capped = if observed < last {
        let floor = last.checked_add(blocks.checked_mul(log_max_decrease)?)?;
        if observed < floor {
            floor
        } else {
            observed
        }
    } else {
        let ceiling = last.checked_add(blocks.checked_mul(log_max_increase)?)?;
        if observed > ceiling {
            ceiling
        } else {
            observed
        }
    };

    trace!(%last, %observed, %capped, blocks_passed, "capped reserve");
    Ok(capped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn params() -> PumpParams {
        PumpParams::from_config(&PumpConfig::symmetric(dec!(0.5))).unwrap()
    }

    fn log(reserve: u128) -> Quad {
        Quad::log2_of_u128(reserve).unwrap()
    }

    fn linear(log: Quad) -> u128 {
        log.pow2_to_u128().unwrap()
    }

    #[test]
    fn test_bounds_from_config() {
        let p = params();
        assert!((p.log_max_increase.to_f64() - 1.5f64.log2()).abs() < 1e-15);
        assert_eq!(p.log_max_decrease, Quad::from_i128(-1));
        assert_eq!(p.block_time, 12);
    }

    #[test]
    fn test_zero_bounds_pin_reserve() {
        let p = PumpParams::from_config(&PumpConfig::symmetric(Decimal::ZERO)).unwrap();
        assert!(p.log_max_increase.is_zero());
        assert!(p.log_max_decrease.is_zero());
        let last = log(1_000);
        assert_eq!(p.cap(last, log(5_000), 10).unwrap(), last);
        assert_eq!(p.cap(last, log(10), 10).unwrap(), last);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = PumpConfig::default().with_block_time(0);
        assert!(PumpParams::from_config(&config).is_err());
    }

    #[test]
    fn test_no_blocks_returns_last() {
        let p = params();
        let last = log(10_000_000_000_000_000);
        assert_eq!(p.cap(last, log(1), 0).unwrap(), last);
        assert_eq!(p.cap(last, log(u128::MAX), 0).unwrap(), last);
    }

    #[test]
    fn test_one_block_increase_is_capped() {
        let capped = params().cap(log(10_000_000_000_000_000), log(20_000_000_000_000_000), 1);
        let capped = linear(capped.unwrap());
        assert!(capped.abs_diff(15_000_000_000_000_000) <= 1, "got {}", capped);
    }

    #[test]
    fn test_one_block_decrease_is_capped() {
        let capped = params().cap(log(10_000_000_000_000_000), log(1_000_000_000_000_000), 1);
        let capped = linear(capped.unwrap());
        assert!(capped.abs_diff(5_000_000_000_000_000) <= 1, "got {}", capped);
    }

    #[test]
    fn test_cap_compounds_over_blocks() {
        let capped = params().cap(log(10_000_000_000_000_000), log(40_000_000_000_000_000), 2);
        let capped = linear(capped.unwrap());
        assert!(capped.abs_diff(22_500_000_000_000_000) <= 1, "got {}", capped);
    }

    #[test]
    fn test_within_bounds_passes_through() {
        let observed = log(12_000_000_000_000_000);
        let capped = params().cap(log(10_000_000_000_000_000), observed, 2).unwrap();
        assert_eq!(capped, observed);
    }

    #[test]
    fn test_asymmetric_bounds() {
        let config = PumpConfig {
            max_percent_increase: dec!(1),
            max_percent_decrease: dec!(0.75),
            ..PumpConfig::default()
        };
        let p = PumpParams::from_config(&config).unwrap();
        assert_eq!(p.log_max_increase, Quad::ONE);
        assert_eq!(p.log_max_decrease, Quad::from_i128(-2));

        let last = log(1 << 60);
        assert_eq!(p.cap(last, log(1 << 70), 3).unwrap(), log(1 << 63));
        assert_eq!(p.cap(last, log(1 << 40), 3).unwrap(), log(1 << 54));
    }

    proptest! {
        #[test]
        fn prop_capped_stays_in_envelope(
            last in 1u128..(1u128 << 100),
            observed in 1u128..(1u128 << 100),
            blocks in 0u64..50,
        ) {
            let p = params();
            let (last, observed) = (log(last), log(observed));
            let capped = p.cap(last, observed, blocks).unwrap();

            let blocks_q = Quad::from(blocks);
            let ceiling = last.checked_add(blocks_q.checked_mul(p.log_max_increase).unwrap()).unwrap();
            let floor = last.checked_add(blocks_q.checked_mul(p.log_max_decrease).unwrap()).unwrap();
            prop_assert!(capped <= ceiling);
            prop_assert!(capped >= floor);
            if blocks > 0 && observed >= floor && observed <= ceiling {
                prop_assert_eq!(capped, observed);
            }
        }
    }
}
