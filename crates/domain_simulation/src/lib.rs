//! Benefit Waterfall Simulation
//!
//! This crate computes how a clinical scenario's costs are funded under a
//! plan, and what a household pays in premiums.
//!
//! # Components
//!
//! - **Waterfall allocator**: funds each line item in order from savings,
//!   the self-payment gap, the above-threshold benefit and risk sub-limits,
//!   leaving the rest as member shortfall
//! - **Result aggregator**: rolls allocation records into totals, rounding
//!   once at the end
//! - **Income-band resolver**: household premium and cliff detection
//! - **Comparison**: one scenario across many plans, ranked by shortfall
//!
//! Every entry point is a pure function over immutable inputs. Each call
//! builds its own [`PoolLedger`], so calls can run in parallel across plans
//! without synchronization.
//!
//! # Conservation
//!
//! ```text
//! financials.plan_pays + financials.shortfall == financials.total_event_cost
//! ```

pub mod allocation;
pub mod ledger;
pub mod waterfall;
pub mod aggregator;
pub mod band_resolver;
pub mod comparison;
pub mod config;
pub mod error;

pub use allocation::{AllocationReason, AllocationRecord, FundingSource, FundingSplit, PoolSnapshot};
pub use ledger::PoolLedger;
pub use waterfall::{is_pmb, run_simulation};
pub use aggregator::{Financials, SimulationResult};
pub use band_resolver::{
    check_income_volatility, check_income_volatility_with, resolve_premium, CliffWarning,
    PremiumResolution,
};
pub use comparison::{
    compare_plan, compare_plans, ComparisonEntry, HouseholdIncome, OmittedPlan, PlanComparison,
};
pub use config::SimulationConfig;
pub use error::SimulationError;
