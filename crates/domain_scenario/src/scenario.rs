//! Clinical scenario aggregate

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BillingCategory, ConditionCode, Currency, Money, ScenarioCode};

use crate::error::ScenarioError;

/// Stage of care a line item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarePhase {
    /// Consultations and tests leading to a diagnosis
    Diagnosis,
    /// Procedures, admissions and acute treatment
    #[default]
    Treatment,
    /// Rehabilitation and follow-up after treatment
    Recovery,
    /// Recurring care for a chronic condition
    Ongoing,
}

impl fmt::Display for CarePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CarePhase::Diagnosis => "diagnosis",
            CarePhase::Treatment => "treatment",
            CarePhase::Recovery => "recovery",
            CarePhase::Ongoing => "ongoing",
        };
        f.write_str(name)
    }
}

/// A single billable event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    #[serde(default)]
    pub phase: CarePhase,
    /// Cost at scheme rate
    pub cost: Money,
    pub category: BillingCategory,
    /// Prescribed minimum benefit
    #[serde(default)]
    pub is_pmb: bool,
    /// Item must be obtained from a network or designated provider
    #[serde(default)]
    pub requires_network: bool,
    /// Overrides the scenario-level network compliance assumption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_compliance: Option<bool>,
    /// Chronic condition the item treats
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionCode>,
}

impl LineItem {
    pub fn new(label: impl Into<String>, category: BillingCategory, cost: Money) -> Self {
        Self {
            label: label.into(),
            phase: CarePhase::default(),
            cost,
            category,
            is_pmb: false,
            requires_network: false,
            network_compliance: None,
            condition: None,
        }
    }

    pub fn with_phase(mut self, phase: CarePhase) -> Self {
        self.phase = phase;
        self
    }

    /// Marks the item as a prescribed minimum benefit
    pub fn pmb(mut self) -> Self {
        self.is_pmb = true;
        self
    }

    pub fn requiring_network(mut self) -> Self {
        self.requires_network = true;
        self
    }

    pub fn with_network_compliance(mut self, compliant: bool) -> Self {
        self.network_compliance = Some(compliant);
        self
    }

    pub fn with_condition(mut self, condition: ConditionCode) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// An ordered sequence of billable events
///
/// Line-item order is the order in which plan pools are consumed. Items are
/// never reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalScenario {
    pub code: ScenarioCode,
    pub name: String,
    #[serde(default)]
    pub currency: Currency,
    /// Treat every network-bound item as obtained in network unless the
    /// item says otherwise
    #[serde(default)]
    pub assume_network_compliance: bool,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl ClinicalScenario {
    /// Creates an empty scenario
    pub fn new(code: ScenarioCode, name: impl Into<String>, currency: Currency) -> Self {
        Self {
            code,
            name: name.into(),
            currency,
            assume_network_compliance: false,
            line_items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }

    pub fn assuming_network_compliance(mut self) -> Self {
        self.assume_network_compliance = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Whether the item was obtained in network
    pub fn is_network_compliant(&self, item: &LineItem) -> bool {
        item.network_compliance.unwrap_or(self.assume_network_compliance)
    }

    /// Sum of line-item costs
    pub fn total_cost(&self) -> Money {
        self.line_items
            .iter()
            .fold(Money::zero(self.currency), |acc, item| acc + item.cost)
    }

    /// Checks every line item
    ///
    /// # Errors
    ///
    /// Returns `ScenarioError::Validation` for the first item with a negative
    /// cost, a cost outside the scenario currency, or an empty label.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (index, item) in self.line_items.iter().enumerate() {
            if item.label.trim().is_empty() {
                return Err(ScenarioError::validation(
                    &self.code,
                    format!("line item {} has no label", index),
                ));
            }
            if item.cost.currency() != self.currency {
                return Err(ScenarioError::validation(
                    &self.code,
                    format!(
                        "line item {} ({}) is priced in {}, scenario currency is {}",
                        index, item.label, item.cost.currency(), self.currency
                    ),
                ));
            }
            if item.cost.is_negative() {
                return Err(ScenarioError::validation(
                    &self.code,
                    format!("line item {} ({}) has negative cost {}", index, item.label, item.cost),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn zar(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::ZAR)
    }

    fn scenario() -> ClinicalScenario {
        ClinicalScenario::new(ScenarioCode::new("knee-replacement").unwrap(), "Knee replacement", Currency::ZAR)
    }

    #[test]
    fn test_negative_cost_rejected() {
        let s = scenario().with_item(LineItem::new("Refund", BillingCategory::Other, zar(dec!(-10))));

        assert!(matches!(s.validate(), Err(ScenarioError::Validation { .. })));
    }

    #[test]
    fn test_foreign_currency_rejected() {
        let s = scenario().with_item(LineItem::new(
            "Consult",
            BillingCategory::GP,
            Money::new(dec!(50), Currency::USD),
        ));

        assert!(s.validate().is_err());
    }

    #[test]
    fn test_network_compliance_override() {
        let s = scenario().assuming_network_compliance();
        let item = LineItem::new("Admission", BillingCategory::Hospital, zar(dec!(1000)))
            .requiring_network();

        assert!(s.is_network_compliant(&item));
        assert!(!s.is_network_compliant(&item.clone().with_network_compliance(false)));
    }

    #[test]
    fn test_line_item_defaults_from_json() {
        let json = r#"{
            "label": "GP visit",
            "cost": {"amount": "520", "currency": "ZAR"},
            "category": "gp"
        }"#;
        let item: LineItem = serde_json::from_str(json).unwrap();

        assert_eq!(item.phase, CarePhase::Treatment);
        assert!(!item.is_pmb);
        assert!(!item.requires_network);
        assert!(item.condition.is_none());
    }
}
