//! Simulation handlers

use axum::{extract::State, Json};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::info;
use validator::Validate;

use core_kernel::{Money, PlanCode, ScenarioCode};
use domain_plan::Household;
use domain_scenario::ClinicalScenario;
use domain_simulation::{compare_plan, HouseholdIncome, PlanComparison, SimulationResult};

use crate::dto::simulations::{ComparisonRequest, SimulationRequest};
use crate::{error::ApiError, AppState};

/// Runs one scenario against one plan
pub async fn run_simulation(
    State(state): State<AppState>,
    Json(request): Json<SimulationRequest>,
) -> Result<Json<SimulationResult>, ApiError> {
    request.validate()?;

    let plan = state.plans.get(&PlanCode::new(&request.plan_code)?)?;
    let scenario = scenario_for(&state, request.scenario_code.as_deref(), request.scenario)?;

    let result = domain_simulation::run_simulation(&scenario, &plan)?;

    info!(
        plan = %result.plan_code,
        scenario = %result.scenario_code,
        shortfall = %result.financials.shortfall,
        "Simulation served"
    );

    Ok(Json(result))
}

/// Runs one scenario against several plans, each on the blocking pool
///
/// Plans that fail to simulate are listed under `omitted`; unknown plan
/// codes fail the request.
pub async fn compare_plans(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> Result<Json<PlanComparison>, ApiError> {
    request.validate()?;

    let scenario = scenario_for(&state, request.scenario_code.as_deref(), request.scenario.clone())?;
    let pricing = request.income.map(|income| HouseholdIncome {
        income: Money::new(income, scenario.currency),
        household: Household::new(request.adults, request.children),
    });

    let mut plans = Vec::with_capacity(request.plan_codes.len());
    for code in &request.plan_codes {
        plans.push(state.plans.get(&PlanCode::new(code)?)?);
    }

    let config = Arc::new(state.config.simulation.clone());
    let mut tasks = JoinSet::new();
    for plan in plans {
        let scenario = Arc::clone(&scenario);
        let config = Arc::clone(&config);
        tasks.spawn_blocking(move || {
            let outcome = compare_plan(&scenario, &plan, pricing.as_ref(), &config);
            (plan.identity.code.clone(), outcome)
        });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.map_err(|e| ApiError::Internal(format!("comparison task failed: {}", e)))?);
    }

    let comparison = PlanComparison::from_outcomes(outcomes);

    info!(
        scenario = %scenario.code,
        ranked = comparison.entries.len(),
        omitted = comparison.omitted.len(),
        "Comparison served"
    );

    Ok(Json(comparison))
}

/// Looks up a catalog scenario, or takes the inline one
fn scenario_for(
    state: &AppState,
    code: Option<&str>,
    inline: Option<ClinicalScenario>,
) -> Result<Arc<ClinicalScenario>, ApiError> {
    match (code, inline) {
        (Some(code), None) => Ok(state.scenarios.get(&ScenarioCode::new(code)?)?),
        (None, Some(scenario)) => Ok(Arc::new(scenario)),
        _ => Err(ApiError::validation("give exactly one of scenario_code or scenario")),
    }
}
