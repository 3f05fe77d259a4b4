//! Billing categories shared by plan rules and clinical scenarios

use serde::{Deserialize, Serialize};
use std::fmt;

/// The billing category of a claimable event
///
/// Plans key their network rules and risk sub-limits by category; scenario
/// line items carry one each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCategory {
    Hospital,
    #[serde(rename = "gp")]
    GP,
    Specialist,
    ChronicMedicine,
    Diagnostic,
    Maternity,
    Dental,
    Optical,
    Other,
}

impl BillingCategory {
    /// All categories in declaration order
    pub const ALL: [BillingCategory; 9] = [
        BillingCategory::Hospital,
        BillingCategory::GP,
        BillingCategory::Specialist,
        BillingCategory::ChronicMedicine,
        BillingCategory::Diagnostic,
        BillingCategory::Maternity,
        BillingCategory::Dental,
        BillingCategory::Optical,
        BillingCategory::Other,
    ];

    /// Returns the snake_case label used in data files
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCategory::Hospital => "hospital",
            BillingCategory::GP => "gp",
            BillingCategory::Specialist => "specialist",
            BillingCategory::ChronicMedicine => "chronic_medicine",
            BillingCategory::Diagnostic => "diagnostic",
            BillingCategory::Maternity => "maternity",
            BillingCategory::Dental => "dental",
            BillingCategory::Optical => "optical",
            BillingCategory::Other => "other",
        }
    }
}

impl fmt::Display for BillingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
