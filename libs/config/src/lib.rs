//! # Well Pump Configuration
//!
//! Pump parameters and their layered loading for Well pumps.
//!
//! ## Features
//!
//! - **Pump Parameters**: Per-block capping bounds, block time and EMA decay
//! - **Layered Loading**: TOML file, optional environment file, then `PUMP_*` variables
//! - **Validation**: Range checks before a pump is built from the parameters
//!
//! ## Usage
//!
//! ```rust
//! use rust_decimal_macros::dec;
//! use well_config::PumpConfig;
//!
//! // 50% per block in either direction, 12 second blocks
//! let config = PumpConfig::symmetric(dec!(0.5));
//! assert!(config.validate().is_ok());
//! assert_eq!(config.block_time, 12);
//! ```

pub mod defaults;
pub mod pump_config;

// Re-export commonly used types
pub use pump_config::{load_config, ConfigValidationError, PumpConfig};
