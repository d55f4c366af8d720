//! Response types for the evaluation engine API.
//!
//! This module defines the success bodies and the error response
//! structures for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::approval::{CommittedChange, TransitionEffect};
use crate::calculation::{EvaluationBook, EvaluationUpdate, GroupScoreOverage};
use crate::error::EngineError;
use crate::models::{
    ApprovalRequest, AuditStep, AuditWarning, EvaluationResult, Grade, Period, WorkRateSummary,
};

/// Body of `POST /payout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutResponse {
    /// The evaluation figures.
    pub evaluation: EvaluationResult,
    /// False when the work rate is below the gradeable minimum.
    pub gradeable: bool,
    /// How the figures were derived.
    pub audit_step: AuditStep,
    /// Warnings such as a dropped grade.
    pub warnings: Vec<AuditWarning>,
}

/// One row of `GET /grading-scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeEntry {
    /// The grade label.
    pub grade: Grade,
    /// Score of the grade.
    pub score: Decimal,
    /// Payout rate in percent.
    pub payout_rate_percent: Decimal,
    /// Free-text description.
    pub description: String,
}

/// Body of `POST /approvals/:id/actions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// The request after the action.
    pub request: ApprovalRequest,
    /// What the action did.
    pub effect: TransitionEffect,
    /// The change committed by a final approval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub committed: Option<CommittedChange>,
    /// Work rates of every month the committed change touched.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recomputed_work_rates: Vec<WorkRateSummary>,
    /// Stored evaluations repriced with those work rates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repriced_evaluations: Vec<EvaluationUpdate>,
}

/// Body of `GET /evaluations/:year/:month`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationBookResponse {
    /// The evaluated month.
    pub period: Period,
    /// Every enrolled employee, in employee order.
    pub results: Vec<EvaluationResult>,
    /// Groups over their score budget.
    pub overages: Vec<GroupScoreOverage>,
}

impl From<&EvaluationBook> for EvaluationBookResponse {
    fn from(book: &EvaluationBook) -> Self {
        Self {
            period: book.period(),
            results: book.results().cloned().collect(),
            overages: book.group_score_overages(),
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates an invalid query or path parameter error response.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new("INVALID_PARAMETER", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details("VALIDATION_ERROR", message, field),
            ),
            EngineError::InvalidPeriod { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_PERIOD", message),
            ),
            EngineError::UnknownAttendanceType { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("UNKNOWN_ATTENDANCE_TYPE", message),
            ),
            EngineError::UnknownGrade { grade } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "UNKNOWN_GRADE",
                    message,
                    format!("'{}' is not part of the current grading scale", grade),
                ),
            ),
            EngineError::InvalidTransition { reason, .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details("INVALID_TRANSITION", message, reason),
            ),
            EngineError::VersionConflict { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "VERSION_CONFLICT",
                    message,
                    "Reload the request and decide again",
                ),
            ),
            EngineError::RecordNotFound { .. } => (
                StatusCode::CONFLICT,
                ApiError::with_details(
                    "RECORD_NOT_FOUND",
                    message,
                    "The change targets a record that is not in the record store",
                ),
            ),
            EngineError::RequestNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("REQUEST_NOT_FOUND", message),
            ),
            EngineError::EmployeeNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("EMPLOYEE_NOT_FOUND", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_validation_maps_to_400_with_field() {
        let response: ApiErrorResponse = EngineError::validation("end_time", "must be later").into();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error.code, "VALIDATION_ERROR");
        assert_eq!(response.error.details.as_deref(), Some("end_time"));
    }

    #[test]
    fn test_invalid_transition_maps_to_409() {
        let response: ApiErrorResponse = EngineError::InvalidTransition {
            request_id: Uuid::nil(),
            stage: "pending".to_string(),
            action: "approve_hr".to_string(),
            reason: "the request is not awaiting an HR decision".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::CONFLICT);
        assert_eq!(response.error.code, "INVALID_TRANSITION");
    }

    #[test]
    fn test_missing_request_maps_to_404() {
        let response: ApiErrorResponse = EngineError::RequestNotFound {
            request_id: Uuid::nil(),
        }
        .into();
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_error_maps_to_500() {
        let response: ApiErrorResponse = EngineError::ConfigNotFound {
            path: "grading_scale.yaml".to_string(),
        }
        .into();
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.error.code, "CONFIG_ERROR");
    }
}
