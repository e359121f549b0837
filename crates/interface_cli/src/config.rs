//! CLI configuration

use core_kernel::{Currency, MoneyError};
use domain_flow::EngineConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable prefix (`FLOWCALC_LOG_LEVEL`, `FLOWCALC_TOLERANCE`, ...)
pub const ENV_PREFIX: &str = "FLOWCALC";

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Log level
    pub log_level: String,
    /// Overage tolerated before a flow counts as exceeding the price
    pub tolerance: Decimal,
    /// Quiet period for debounced recomputes, in milliseconds
    pub debounce_ms: u64,
    /// Currency code used when a snapshot carries none
    pub currency: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            tolerance: domain_flow::config::DEFAULT_TOLERANCE,
            debounce_ms: 100,
            currency: Currency::default().code().to_string(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads configuration from the given environment source, filling gaps with defaults
    pub fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("log_level", defaults.log_level)?
            .set_default("tolerance", defaults.tolerance.to_string())?
            .set_default("debounce_ms", defaults.debounce_ms)?
            .set_default("currency", defaults.currency)?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// Currency for snapshots that do not name one
    pub fn default_currency(&self) -> Result<Currency, MoneyError> {
        self.currency.parse()
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_tolerance(self.tolerance)
            .with_debounce(Duration::from_millis(self.debounce_ms))
    }
}
