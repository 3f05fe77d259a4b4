//! API error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::CoreError;
use domain_plan::PlanError;
use domain_scenario::ScenarioError;
use domain_simulation::SimulationError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request is well-formed but the plan cannot serve it
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String, Option<Vec<String>>),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into(), None)
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
            ApiError::Validation(msg, details) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg, details)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<SimulationError> for ApiError {
    fn from(err: SimulationError) -> Self {
        match err {
            SimulationError::Validation(_) => ApiError::validation(err.to_string()),
            SimulationError::Configuration(_) | SimulationError::BandNotFound { .. } => {
                ApiError::Conflict(err.to_string())
            }
        }
    }
}

impl From<PlanError> for ApiError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::NotFound(_) => ApiError::NotFound(err.to_string()),
            PlanError::Configuration { .. } | PlanError::BandNotFound { .. } => {
                ApiError::Conflict(err.to_string())
            }
            PlanError::Parse(_) => ApiError::BadRequest(err.to_string()),
            PlanError::Io { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ScenarioError> for ApiError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ScenarioError::Validation { .. } => ApiError::validation(err.to_string()),
            ScenarioError::Parse(_) => ApiError::BadRequest(err.to_string()),
            ScenarioError::Io { .. } => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| match &error.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, error.code),
                })
            })
            .collect();
        ApiError::Validation("request failed validation".to_string(), Some(details))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::from(SimulationError::Validation("bad".into())), StatusCode::UNPROCESSABLE_ENTITY),
            (ApiError::from(SimulationError::Configuration("bad".into())), StatusCode::CONFLICT),
            (ApiError::from(PlanError::not_found("nope")), StatusCode::NOT_FOUND),
            (ApiError::from(ScenarioError::not_found("nope")), StatusCode::NOT_FOUND),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
