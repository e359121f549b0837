//! Engine tuning

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default rounding tolerance when comparing the total against the price
pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// Default quiet period before a scheduled recompute runs
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Settings shared by the aggregator and the edit session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Amount by which the total may exceed the price before it counts as overage
    pub tolerance: Decimal,
    /// Quiet period for coalescing recompute triggers
    pub debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

impl EngineConfig {
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance.max(Decimal::ZERO);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
