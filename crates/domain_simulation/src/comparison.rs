//! Running one scenario across several plans
//!
//! A plan that fails to simulate or price is omitted from the ranking and
//! listed with its error; it never fails the comparison as a whole.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use core_kernel::{Money, PlanCode};
use domain_plan::{Household, PlanBenefitModel};
use domain_scenario::ClinicalScenario;

use crate::aggregator::Financials;
use crate::band_resolver::{check_income_volatility_with, resolve_premium, CliffWarning};
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::waterfall::run_simulation;

/// Household income used to price each plan in a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseholdIncome {
    pub income: Money,
    #[serde(default)]
    pub household: Household,
}

/// One plan's outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub plan_code: PlanCode,
    pub plan_name: String,
    pub financials: Financials,
    /// Monthly household premium, when a household income was supplied
    pub monthly_premium: Option<Money>,
    /// Twelve months of premium plus the scenario shortfall
    pub annual_cost: Option<Money>,
    pub cliff_warning: Option<CliffWarning>,
}

/// A plan left out of the ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OmittedPlan {
    pub plan_code: PlanCode,
    pub error: String,
}

/// Plans ranked by member shortfall
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanComparison {
    /// Ascending shortfall, then plan code
    pub entries: Vec<ComparisonEntry>,
    pub omitted: Vec<OmittedPlan>,
}

impl PlanComparison {
    /// Ranks per-plan outcomes, setting failures aside
    pub fn from_outcomes<I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (PlanCode, Result<ComparisonEntry, SimulationError>)>,
    {
        let mut entries = Vec::new();
        let mut omitted = Vec::new();

        for (plan_code, outcome) in outcomes {
            match outcome {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    warn!(plan = %plan_code, error = %err, "Omitting plan from comparison");
                    omitted.push(OmittedPlan {
                        plan_code,
                        error: err.to_string(),
                    });
                }
            }
        }

        entries.sort_by(|a, b| {
            a.financials
                .shortfall
                .amount()
                .cmp(&b.financials.shortfall.amount())
                .then_with(|| a.plan_code.cmp(&b.plan_code))
        });
        omitted.sort_by(|a, b| a.plan_code.cmp(&b.plan_code));

        Self { entries, omitted }
    }

    /// The plan with the lowest shortfall, if any plan succeeded
    pub fn best(&self) -> Option<&ComparisonEntry> {
        self.entries.first()
    }
}

/// Simulates, and optionally prices, a single plan for a comparison
pub fn compare_plan(
    scenario: &ClinicalScenario,
    plan: &PlanBenefitModel,
    pricing: Option<&HouseholdIncome>,
    config: &SimulationConfig,
) -> Result<ComparisonEntry, SimulationError> {
    let result = run_simulation(scenario, plan)?;

    let (monthly_premium, annual_cost, cliff_warning) = match pricing {
        Some(pricing) => {
            let resolution = resolve_premium(plan, pricing.income, &pricing.household)?;
            let cliff = check_income_volatility_with(plan, pricing.income, &pricing.household, config)?;
            let annual = resolution.premium * Decimal::from(12) + result.financials.shortfall;
            (Some(resolution.premium), Some(annual), cliff)
        }
        None => (None, None, None),
    };

    Ok(ComparisonEntry {
        plan_code: result.plan_code,
        plan_name: result.plan_name,
        financials: result.financials,
        monthly_premium,
        annual_cost,
        cliff_warning,
    })
}

/// Runs a scenario against every plan and ranks the outcomes
pub fn compare_plans(
    scenario: &ClinicalScenario,
    plans: &[Arc<PlanBenefitModel>],
    pricing: Option<&HouseholdIncome>,
    config: &SimulationConfig,
) -> PlanComparison {
    let comparison = PlanComparison::from_outcomes(plans.iter().map(|plan| {
        (
            plan.identity.code.clone(),
            compare_plan(scenario, plan, pricing, config),
        )
    }));

    debug!(
        scenario = %scenario.code,
        ranked = comparison.entries.len(),
        omitted = comparison.omitted.len(),
        "Plan comparison complete"
    );

    comparison
}
