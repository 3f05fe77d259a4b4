//! Scenario domain errors

use thiserror::Error;

use core_kernel::ScenarioCode;

/// Errors that can occur in the scenario domain
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// A line item or the scenario itself is malformed
    #[error("Validation error in scenario {scenario}: {message}")]
    Validation {
        scenario: String,
        message: String,
    },

    #[error("Failed to parse scenario data: {0}")]
    Parse(String),

    #[error("Failed to read scenario data from {path}: {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Scenario not found: {0}")]
    NotFound(String),
}

impl ScenarioError {
    pub fn validation(scenario: &ScenarioCode, message: impl Into<String>) -> Self {
        ScenarioError::Validation {
            scenario: scenario.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl std::fmt::Display) -> Self {
        ScenarioError::NotFound(code.to_string())
    }
}
