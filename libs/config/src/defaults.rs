//! Pump configuration defaults
//!
//! Values a pump falls back to when no file or environment override is given.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/pump.toml";

/// Environment variable prefix (`PUMP_BLOCK_TIME`, `PUMP_ALPHA`, ...)
pub const ENV_PREFIX: &str = "PUMP";

/// Largest fractional reserve change allowed per block, both directions
pub const MAX_PERCENT_CHANGE: Decimal = dec!(0.5);

/// Seconds per block on the host chain
pub const BLOCK_TIME_SECS: u64 = 12;

/// EMA decay per second (half-life of roughly 1248 seconds)
pub const ALPHA: Decimal = dec!(0.9994445987282384);
