//! Premium DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use domain_plan::Household;
use domain_simulation::{CliffWarning, PremiumResolution};

/// Household income to price against a plan's band table
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PremiumRequest {
    #[validate(length(min = 1, max = 128))]
    pub plan_code: String,
    /// Monthly household income, in the plan currency
    pub income: Decimal,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub adults: u32,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub children: u32,
}

impl PremiumRequest {
    pub fn household(&self) -> Household {
        Household::new(self.adults, self.children)
    }
}

/// The band, household premium and any cliff at the next boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumResponse {
    #[serde(flatten)]
    pub resolution: PremiumResolution,
    pub cliff_warning: Option<CliffWarning>,
}
