//! Simulation errors
//!
//! Errors are raised synchronously and never retried. A failed simulation
//! produces no partial result.

use thiserror::Error;

use core_kernel::{Money, MoneyError};
use domain_plan::PlanError;
use domain_scenario::ScenarioError;

/// Errors that can occur while simulating or resolving premiums
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A line item or request input is malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The plan's benefit structure is malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No income band covers the household income
    #[error("No income band on plan {plan} covers income {income}")]
    BandNotFound {
        plan: String,
        income: Money,
    },
}

impl From<PlanError> for SimulationError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::BandNotFound { plan, income } => SimulationError::BandNotFound { plan, income },
            other => SimulationError::Configuration(other.to_string()),
        }
    }
}

impl From<ScenarioError> for SimulationError {
    fn from(err: ScenarioError) -> Self {
        SimulationError::Validation(err.to_string())
    }
}

impl From<MoneyError> for SimulationError {
    fn from(err: MoneyError) -> Self {
        SimulationError::Validation(err.to_string())
    }
}
