//! Income-band premium resolution and cliff detection
//!
//! Banding is household-level: the household income selects one band and
//! every member pays that band's rate.
//!
//! A cliff is a band boundary where a small rise in income causes a
//! disproportionate premium jump. For income `i` in band `[min, max)` the
//! next band starts at `max`, so:
//!
//! ```text
//! cliff_amount = next.min_income - i
//! premium_jump = premium(next) - premium(current)
//! has_cliff    = premium_jump > 0 && premium_jump / cliff_amount > materiality ratio
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use core_kernel::{Money, PlanCode};
use domain_plan::{Household, IncomeBand, PlanBenefitModel, PlanError};

use crate::config::SimulationConfig;
use crate::error::SimulationError;

/// The band and monthly premium for a household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumResolution {
    pub plan_code: PlanCode,
    pub band_index: usize,
    pub band: IncomeBand,
    pub household: Household,
    /// Household premium, rounded to the currency's minor unit
    pub premium: Money,
}

/// Premium discontinuity at the next band boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliffWarning {
    pub has_cliff: bool,
    /// Household premium increase on entering the next band
    pub premium_jump: Money,
    /// Income rise that moves the household into the next band
    pub cliff_amount: Money,
    pub next_band_min_income: Money,
}

/// Resolves the band and household premium for an income
///
/// # Arguments
///
/// * `plan` - The plan whose band table is used
/// * `income` - Household income, in the plan currency
/// * `household` - Dependants beyond the main member
///
/// # Errors
///
/// Returns `SimulationError::BandNotFound` when no band contains the
/// income (negative incomes on a well-formed plan), and
/// `SimulationError::Validation` when the income is in another currency.
pub fn resolve_premium(
    plan: &PlanBenefitModel,
    income: Money,
    household: &Household,
) -> Result<PremiumResolution, SimulationError> {
    let (band_index, band) = find_band(plan, &income)?;
    let premium = band.premium.for_household(household).round_half_up();

    debug!(
        plan = %plan.identity.code,
        income = %income,
        band = band_index,
        premium = %premium,
        "Resolved premium band"
    );

    Ok(PremiumResolution {
        plan_code: plan.identity.code.clone(),
        band_index,
        band: band.clone(),
        household: *household,
        premium,
    })
}

/// Checks the next band boundary for a premium cliff, with default settings
///
/// Returns `Ok(None)` when the income is already in the top band.
pub fn check_income_volatility(
    plan: &PlanBenefitModel,
    income: Money,
    household: &Household,
) -> Result<Option<CliffWarning>, SimulationError> {
    check_income_volatility_with(plan, income, household, &SimulationConfig::default())
}

/// Checks the next band boundary for a premium cliff
///
/// # Errors
///
/// Same as [`resolve_premium`].
pub fn check_income_volatility_with(
    plan: &PlanBenefitModel,
    income: Money,
    household: &Household,
    config: &SimulationConfig,
) -> Result<Option<CliffWarning>, SimulationError> {
    let (index, current) = find_band(plan, &income)?;
    let Some(next) = plan.income_bands.next_after(index) else {
        return Ok(None);
    };

    let current_premium = current.premium.for_household(household);
    let next_premium = next.premium.for_household(household);
    let premium_jump = (next_premium - current_premium).round_half_up();
    let cliff_amount = next.min_income - income;

    let has_cliff = premium_jump.is_positive()
        && cliff_amount.is_positive()
        && premium_jump.amount() / cliff_amount.amount() > config.cliff_materiality_ratio;

    if has_cliff {
        debug!(
            plan = %plan.identity.code,
            income = %income,
            jump = %premium_jump,
            cliff_amount = %cliff_amount,
            "Premium cliff at next band boundary"
        );
    }

    Ok(Some(CliffWarning {
        has_cliff,
        premium_jump,
        cliff_amount,
        next_band_min_income: next.min_income,
    }))
}

fn find_band<'p>(plan: &'p PlanBenefitModel, income: &Money) -> Result<(usize, &'p IncomeBand), SimulationError> {
    if income.currency() != plan.currency {
        return Err(SimulationError::Validation(format!(
            "income is in {} but plan {} is priced in {}",
            income.currency(),
            plan.identity.code,
            plan.currency
        )));
    }

    plan.income_bands
        .find(income)
        .ok_or_else(|| PlanError::band_not_found(&plan.identity.code, *income).into())
}
