//! Audit trail models.
//!
//! Every derivation step records an [`AuditStep`] so a report can explain how
//! a work rate or payout was reached. Conditions that let a calculation
//! proceed but deserve attention are recorded as [`AuditWarning`]s.

use serde::{Deserialize, Serialize};

/// Warning code for a daily record whose attendance type is not configured.
pub const WARNING_UNKNOWN_ATTENDANCE_TYPE: &str = "UNKNOWN_ATTENDANCE_TYPE";

/// Warning code for an evaluation group whose total score exceeds its cap.
pub const WARNING_GROUP_SCORE_OVERAGE: &str = "GROUP_SCORE_OVERAGE";

/// Warning code for a grade that was dropped because the work rate is too low.
pub const WARNING_NOT_GRADEABLE: &str = "NOT_GRADEABLE";

/// Warning code for a stored grade that is no longer part of the grading scale.
pub const WARNING_GRADE_REMOVED: &str = "GRADE_REMOVED";

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during calculation.
///
/// Warnings never block the action that produced them.
///
/// # Example
///
/// ```
/// use evaluation_engine::models::AuditWarning;
///
/// let warning = AuditWarning::new("UNKNOWN_ATTENDANCE_TYPE", "type '외근' is not configured", "medium");
/// assert_eq!(warning.severity, "medium");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

impl AuditWarning {
    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// The audit trace of one derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// The number to give the next recorded step.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if any warning carries `code`.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(n: u32) -> AuditStep {
        AuditStep {
            step_number: n,
            rule_id: "business_day_count".to_string(),
            rule_name: "Business Day Count".to_string(),
            input: serde_json::json!({}),
            output: serde_json::json!({}),
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_next_step_number_follows_recorded_steps() {
        let mut trace = AuditTrace::default();
        assert_eq!(trace.next_step_number(), 1);
        trace.steps.push(step(1));
        trace.steps.push(step(2));
        assert_eq!(trace.next_step_number(), 3);
    }

    #[test]
    fn test_has_warning() {
        let trace = AuditTrace {
            steps: vec![],
            warnings: vec![AuditWarning::new(
                WARNING_UNKNOWN_ATTENDANCE_TYPE,
                "unknown",
                "medium",
            )],
        };
        assert!(trace.has_warning(WARNING_UNKNOWN_ATTENDANCE_TYPE));
        assert!(!trace.has_warning(WARNING_NOT_GRADEABLE));
    }

    #[test]
    fn test_serialize_audit_trace() {
        let trace = AuditTrace {
            steps: vec![step(1)],
            warnings: vec![],
        };
        let json = serde_json::to_string(&trace).unwrap();
        assert!(json.contains("\"rule_id\":\"business_day_count\""));
        assert!(json.contains("\"warnings\":[]"));
    }
}
