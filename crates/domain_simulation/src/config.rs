//! Simulation settings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Tunables for the simulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// A band boundary is a cliff when `premium_jump / cliff_amount`
    /// exceeds this ratio. Zero flags any positive jump.
    pub cliff_materiality_ratio: Decimal,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cliff_materiality_ratio: Decimal::ZERO,
        }
    }
}

impl SimulationConfig {
    pub fn with_cliff_materiality_ratio(mut self, ratio: Decimal) -> Self {
        self.cliff_materiality_ratio = ratio;
        self
    }
}
