//! Simulation and comparison DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use domain_scenario::ClinicalScenario;

/// Runs one plan against a catalog or inline scenario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_simulation_source"))]
pub struct SimulationRequest {
    #[validate(length(min = 1, max = 128))]
    pub plan_code: String,
    /// Code of a catalog scenario
    #[serde(default)]
    pub scenario_code: Option<String>,
    /// A scenario supplied in the request
    #[serde(default)]
    pub scenario: Option<ClinicalScenario>,
}

/// Runs several plans against one scenario
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_comparison_source"))]
pub struct ComparisonRequest {
    #[validate(length(min = 1, max = 64, message = "between 1 and 64 plan codes"))]
    pub plan_codes: Vec<String>,
    #[serde(default)]
    pub scenario_code: Option<String>,
    #[serde(default)]
    pub scenario: Option<ClinicalScenario>,
    /// Monthly household income, in the scenario currency; prices each plan when present
    #[serde(default)]
    pub income: Option<Decimal>,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub adults: u32,
    #[serde(default)]
    #[validate(range(max = 20))]
    pub children: u32,
}

fn scenario_source(code: &Option<String>, inline: &Option<ClinicalScenario>) -> Result<(), ValidationError> {
    match (code, inline) {
        (Some(_), None) | (None, Some(_)) => Ok(()),
        (Some(_), Some(_)) => Err(ValidationError::new("scenario_source")
            .with_message("give either scenario_code or scenario, not both".into())),
        (None, None) => Err(ValidationError::new("scenario_source")
            .with_message("scenario_code or scenario is required".into())),
    }
}

fn validate_simulation_source(request: &SimulationRequest) -> Result<(), ValidationError> {
    scenario_source(&request.scenario_code, &request.scenario)
}

fn validate_comparison_source(request: &ComparisonRequest) -> Result<(), ValidationError> {
    scenario_source(&request.scenario_code, &request.scenario)
}
