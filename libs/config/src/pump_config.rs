//! Pump Configuration Module
//!
//! Loads pump parameters from TOML files with environment-specific overrides
//! and `PUMP_*` environment variables, then validates them before a pump is
//! built from them.

use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::defaults;

/// Parameters of a geometric EMA and cumulative pump
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PumpConfig {
    /// Largest fractional increase per block, e.g. `0.5` for +50%
    pub max_percent_increase: Decimal,

    /// Largest fractional decrease per block, must stay below 1
    pub max_percent_decrease: Decimal,

    /// Seconds per block
    pub block_time: u64,

    /// EMA decay factor applied once per elapsed second
    pub alpha: Decimal,
}

/// Semantic problems with otherwise well-formed configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("max_percent_increase must be non-negative, got {0}")]
    NegativeIncrease(Decimal),

    #[error("max_percent_decrease must be in [0, 1), got {0}")]
    DecreaseOutOfRange(Decimal),

    #[error("alpha must be in (0, 1), got {0}")]
    AlphaOutOfRange(Decimal),

    #[error("block_time must be positive")]
    ZeroBlockTime,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self::symmetric(defaults::MAX_PERCENT_CHANGE)
    }
}

impl PumpConfig {
    /// Single-percentage form: the same bound up and down
    pub fn symmetric(max_percent_change: Decimal) -> Self {
        Self {
            max_percent_increase: max_percent_change,
            max_percent_decrease: max_percent_change,
            block_time: defaults::BLOCK_TIME_SECS,
            alpha: defaults::ALPHA,
        }
    }

    pub fn with_block_time(mut self, block_time: u64) -> Self {
        self.block_time = block_time;
        self
    }

    pub fn with_alpha(mut self, alpha: Decimal) -> Self {
        self.alpha = alpha;
        self
    }

    /// Load configuration from files with environment overrides
    ///
    /// `environment` selects `environments/<env>.toml` next to the base file.
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        Self::load_with_prefix(base_path, environment, defaults::ENV_PREFIX)
    }

    /// [`PumpConfig::load`] reading environment variables under `prefix`
    pub fn load_with_prefix(
        base_path: Option<&Path>,
        environment: Option<&str>,
        prefix: &str,
    ) -> Result<Self> {
        let base = expand_path(base_path.unwrap_or(Path::new(defaults::DEFAULT_CONFIG_PATH)))?;

        let mut builder = Config::builder().add_source(File::from(base.as_path()).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .unwrap_or(Path::new("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables, e.g. PUMP_BLOCK_TIME=2
        builder = builder.add_source(
            Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build pump configuration")?;

        let pump: PumpConfig = config
            .try_deserialize()
            .context("Failed to deserialize pump configuration")?;

        pump.validate()
            .with_context(|| format!("Invalid pump configuration in {:?}", base))?;

        debug!(?pump, "pump configuration loaded");
        Ok(pump)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> std::result::Result<(), ConfigValidationError> {
        if self.max_percent_increase.is_sign_negative() && !self.max_percent_increase.is_zero() {
            return Err(ConfigValidationError::NegativeIncrease(
                self.max_percent_increase,
            ));
        }
        if (self.max_percent_decrease.is_sign_negative() && !self.max_percent_decrease.is_zero())
            || self.max_percent_decrease >= Decimal::ONE
        {
            return Err(ConfigValidationError::DecreaseOutOfRange(
                self.max_percent_decrease,
            ));
        }
        if self.alpha <= Decimal::ZERO || self.alpha >= Decimal::ONE {
            return Err(ConfigValidationError::AlphaOutOfRange(self.alpha));
        }
        if self.block_time == 0 {
            return Err(ConfigValidationError::ZeroBlockTime);
        }
        Ok(())
    }

    /// Render as TOML, the format [`PumpConfig::load`] reads
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize pump configuration")
    }
}

/// Expand `~` and `$VARS` in a configuration path
fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Failed to expand config path {:?}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Convenience function to load configuration from the default location
pub fn load_config(environment: Option<&str>) -> Result<PumpConfig> {
    PumpConfig::load(None, environment)
}
