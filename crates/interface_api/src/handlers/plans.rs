//! Plan catalog handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::PlanCode;
use domain_plan::PlanBenefitModel;

use crate::dto::plans::PlanSummary;
use crate::{error::ApiError, AppState};

/// Lists every plan, ordered by code
pub async fn list_plans(State(state): State<AppState>) -> Json<Vec<PlanSummary>> {
    Json(state.plans.plans().map(|plan| PlanSummary::from(plan.as_ref())).collect())
}

/// Gets a plan's full benefit model
pub async fn get_plan(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PlanBenefitModel>, ApiError> {
    let plan = state.plans.get(&PlanCode::new(&code)?)?;
    Ok(Json(plan.as_ref().clone()))
}

/// Other options of the same scheme and benefit year, cheapest headline
/// co-payment first
pub async fn related_plans(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Vec<PlanSummary>>, ApiError> {
    let related = state.plans.related_plans(&PlanCode::new(&code)?)?;
    Ok(Json(related.iter().map(|plan| PlanSummary::from(plan.as_ref())).collect()))
}
