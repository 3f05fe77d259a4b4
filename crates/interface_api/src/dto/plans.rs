//! Catalog DTOs

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, PlanCode, ScenarioCode, SchemeCode};
use domain_plan::PlanBenefitModel;
use domain_scenario::ClinicalScenario;

/// A catalog entry for a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub code: PlanCode,
    pub scheme: SchemeCode,
    pub option_name: String,
    pub benefit_year: i32,
    pub currency: Currency,
    pub headline_copayment: Option<Money>,
    pub savings_annual_allocation: Money,
    pub annual_threshold: Money,
    pub income_bands: usize,
}

impl From<&PlanBenefitModel> for PlanSummary {
    fn from(plan: &PlanBenefitModel) -> Self {
        Self {
            code: plan.identity.code.clone(),
            scheme: plan.identity.scheme.clone(),
            option_name: plan.identity.option_name.clone(),
            benefit_year: plan.identity.benefit_year,
            currency: plan.currency,
            headline_copayment: plan.identity.headline_copayment,
            savings_annual_allocation: plan.savings_annual_allocation,
            annual_threshold: plan.annual_threshold,
            income_bands: plan.income_bands.len(),
        }
    }
}

/// A catalog entry for a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub code: ScenarioCode,
    pub name: String,
    pub currency: Currency,
    pub line_items: usize,
    pub total_cost: Money,
}

impl From<&ClinicalScenario> for ScenarioSummary {
    fn from(scenario: &ClinicalScenario) -> Self {
        Self {
            code: scenario.code.clone(),
            name: scenario.name.clone(),
            currency: scenario.currency,
            line_items: scenario.line_items.len(),
            total_cost: scenario.total_cost(),
        }
    }
}
