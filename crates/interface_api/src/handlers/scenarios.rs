//! Scenario catalog handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::ScenarioCode;
use domain_scenario::ClinicalScenario;

use crate::dto::plans::ScenarioSummary;
use crate::{error::ApiError, AppState};

pub async fn list_scenarios(State(state): State<AppState>) -> Json<Vec<ScenarioSummary>> {
    Json(
        state
            .scenarios
            .scenarios()
            .map(|scenario| ScenarioSummary::from(scenario.as_ref()))
            .collect(),
    )
}

pub async fn get_scenario(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ClinicalScenario>, ApiError> {
    let scenario = state.scenarios.get(&ScenarioCode::new(&code)?)?;
    Ok(Json(scenario.as_ref().clone()))
}
