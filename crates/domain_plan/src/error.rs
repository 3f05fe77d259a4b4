//! Plan domain errors
//!
//! This module defines all error types that can occur while loading,
//! resolving and validating plan benefit structures.

use thiserror::Error;

use core_kernel::{Money, PlanCode};

/// Errors that can occur in the plan domain
#[derive(Debug, Error)]
pub enum PlanError {
    /// The plan's benefit structure is malformed
    #[error("Configuration error in plan {plan}: {message}")]
    Configuration {
        plan: String,
        message: String,
    },

    /// No income band covers the household income
    #[error("No income band on plan {plan} covers income {income}")]
    BandNotFound {
        plan: String,
        income: Money,
    },

    /// Plan data could not be parsed
    #[error("Failed to parse plan data: {0}")]
    Parse(String),

    /// Plan data could not be read
    #[error("Failed to read plan data from {path}: {message}")]
    Io {
        path: String,
        message: String,
    },

    /// Plan is not in the catalog
    #[error("Plan not found: {0}")]
    NotFound(String),
}

impl PlanError {
    /// Creates a configuration error for a plan
    pub fn configuration(plan: &PlanCode, message: impl Into<String>) -> Self {
        PlanError::Configuration {
            plan: plan.to_string(),
            message: message.into(),
        }
    }

    /// Creates a band-not-found error for a plan
    pub fn band_not_found(plan: &PlanCode, income: Money) -> Self {
        PlanError::BandNotFound {
            plan: plan.to_string(),
            income,
        }
    }

    /// Creates a not found error
    pub fn not_found(code: impl std::fmt::Display) -> Self {
        PlanError::NotFound(code.to_string())
    }
}
