//! Error types for the evaluation engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that blocks a calculation or a workflow action.
//! Conditions that let the action proceed (an unknown attendance type, a
//! group score overage) are reported as [`AuditWarning`](crate::models::AuditWarning)
//! values instead.

use thiserror::Error;
use uuid::Uuid;

/// The main error type for the evaluation engine.
///
/// # Example
///
/// ```
/// use evaluation_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/grading_scale.yaml".to_string(),
/// };
/// assert_eq!(
///     error.to_string(),
///     "Configuration file not found: /missing/grading_scale.yaml"
/// );
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or failed validation.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Input data failed validation.
    #[error("Validation failed for '{field}': {message}")]
    Validation {
        /// The field that was invalid.
        field: String,
        /// A description of the rule that failed.
        message: String,
    },

    /// A year/month pair that does not name a calendar month.
    #[error("Invalid period {year}-{month}")]
    InvalidPeriod {
        /// The requested year.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// An attendance type name with no configured deduction.
    #[error("Unknown attendance type: {name}")]
    UnknownAttendanceType {
        /// The attendance type name that was looked up.
        name: String,
    },

    /// A grade that is not part of the current grading scale.
    #[error("Unknown grade: {grade}")]
    UnknownGrade {
        /// The grade that was not found.
        grade: String,
    },

    /// The requested workflow action is not allowed from the current state
    /// or for the acting user.
    #[error("Invalid transition for request {request_id}: cannot {action} while {stage} ({reason})")]
    InvalidTransition {
        /// The approval request the action targeted.
        request_id: Uuid,
        /// The stage the request was in.
        stage: String,
        /// The attempted action.
        action: String,
        /// Which rule rejected the action.
        reason: String,
    },

    /// No approval request exists with the given id.
    #[error("Approval request not found: {request_id}")]
    RequestNotFound {
        /// The missing request id.
        request_id: Uuid,
    },

    /// No attendance record exists with the given key.
    #[error("Record '{unique_id}' not found for employee '{employee_id}'")]
    RecordNotFound {
        /// The employee owning the record.
        employee_id: String,
        /// The record key.
        unique_id: String,
    },

    /// No evaluation exists for the given employee.
    #[error("Employee not found in evaluation: {employee_id}")]
    EmployeeNotFound {
        /// The missing employee id.
        employee_id: String,
    },

    /// The request was changed by someone else since the caller read it.
    #[error("Approval request {request_id} is at version {actual}, expected {expected}")]
    VersionConflict {
        /// The approval request id.
        request_id: Uuid,
        /// The version the caller based its decision on.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },
}

impl EngineError {
    /// Shorthand for a [`EngineError::Validation`] error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
