//! Premium handlers

use axum::{extract::State, Json};
use validator::Validate;

use core_kernel::{Money, PlanCode};
use domain_simulation::{check_income_volatility_with, resolve_premium, CliffWarning};

use crate::dto::premiums::{PremiumRequest, PremiumResponse};
use crate::{error::ApiError, AppState};

/// Resolves the band and household premium, with any cliff at the next boundary
pub async fn resolve(
    State(state): State<AppState>,
    Json(request): Json<PremiumRequest>,
) -> Result<Json<PremiumResponse>, ApiError> {
    request.validate()?;

    let plan = state.plans.get(&PlanCode::new(&request.plan_code)?)?;
    let income = Money::new(request.income, plan.currency);
    let household = request.household();

    let resolution = resolve_premium(&plan, income, &household)?;
    let cliff_warning =
        check_income_volatility_with(&plan, income, &household, &state.config.simulation)?;

    Ok(Json(PremiumResponse { resolution, cliff_warning }))
}

/// Checks the next band boundary for a premium cliff; `null` in the top band
pub async fn volatility(
    State(state): State<AppState>,
    Json(request): Json<PremiumRequest>,
) -> Result<Json<Option<CliffWarning>>, ApiError> {
    request.validate()?;

    let plan = state.plans.get(&PlanCode::new(&request.plan_code)?)?;
    let income = Money::new(request.income, plan.currency);

    let warning = check_income_volatility_with(&plan, income, &request.household(), &state.config.simulation)?;
    Ok(Json(warning))
}
