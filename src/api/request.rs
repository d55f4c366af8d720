//! Request types for the evaluation engine API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::approval::ApprovalAction;
use crate::models::{Actor, DailyAttendanceRecord, Holiday, Role, ShortenedWorkHourRecord};

/// Request body for `POST /work-rate`.
///
/// Computes a work rate from the supplied records without touching the
/// record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRateRequest {
    /// The employee the records belong to.
    pub employee_id: String,
    /// The year of the evaluated month.
    pub year: i32,
    /// The evaluated month (1-12).
    pub month: u32,
    /// Daily attendance exceptions.
    #[serde(default)]
    pub daily_records: Vec<DailyAttendanceRecord>,
    /// Shortened-work periods.
    #[serde(default)]
    pub shortened_records: Vec<ShortenedWorkHourRecord>,
    /// Replaces the configured holidays when given.
    #[serde(default)]
    pub holidays: Option<Vec<Holiday>>,
}

/// Query string of `GET /employees/:employee_id/work-rate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodQuery {
    /// The year of the evaluated month.
    pub year: i32,
    /// The evaluated month (1-12).
    pub month: u32,
}

/// Request body for `POST /payout`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutRequest {
    /// The evaluated employee.
    pub employee_id: String,
    /// Grade label; omitted or null for an ungraded employee.
    #[serde(default)]
    pub grade: Option<String>,
    /// Amount the payout rate applies to.
    pub base_amount: Decimal,
    /// Work rate in `[0, 1]`.
    pub work_rate: Decimal,
    /// The employee's evaluation group.
    #[serde(default)]
    pub group_key: String,
}

/// Request body for `POST /evaluations/:year/:month/employees`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollRequest {
    /// The employee entering the period.
    pub employee_id: String,
    /// The employee's evaluation group.
    #[serde(default)]
    pub group_key: String,
    /// Amount the payout rate applies to.
    pub base_amount: Decimal,
    /// Work rate in `[0, 1]`. Computed from the stored records when omitted.
    #[serde(default)]
    pub work_rate: Option<Decimal>,
}

/// Request body for `PUT /evaluations/:year/:month/employees/:employee_id/grade`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRequest {
    /// Grade label; null clears the grade.
    pub grade: Option<String>,
}

/// Query string of `GET /approvals/:id/permissions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsQuery {
    /// The acting user.
    pub user_id: String,
    /// The acting user's role.
    pub role: Role,
}

impl From<PermissionsQuery> for Actor {
    fn from(query: PermissionsQuery) -> Self {
        Actor::new(query.user_id, query.role)
    }
}

/// Query string of `GET /approvals`.
///
/// Filters combine; with none given every request is listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovalListQuery {
    /// Only requests submitted by this employee.
    #[serde(default)]
    pub requester_id: Option<String>,
    /// Only pending requests awaiting this team approver.
    #[serde(default)]
    pub team_approver_id: Option<String>,
    /// Only team-approved requests awaiting HR.
    #[serde(default)]
    pub hr_queue: bool,
}

/// Request body for `POST /approvals/:id/actions`.
///
/// ```json
/// {
///   "actor": { "user_id": "lead_01", "role": "evaluator" },
///   "action": "reject_team",
///   "reason": "불충분",
///   "expected_version": 0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Who is acting. Identity comes from the session layer upstream.
    pub actor: Actor,
    /// The action and its arguments.
    #[serde(flatten)]
    pub action: ApprovalAction,
    /// Fails with 409 if the request has moved past this version.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_request_flattens_action() {
        let request: ActionRequest = serde_json::from_value(json!({
            "actor": { "user_id": "lead_01", "role": "evaluator" },
            "action": "reject_team",
            "reason": "불충분",
            "expected_version": 2
        }))
        .unwrap();
        assert_eq!(
            request.action,
            ApprovalAction::RejectTeam {
                reason: "불충분".to_string()
            }
        );
        assert_eq!(request.expected_version, Some(2));
        assert_eq!(request.actor.role, Role::Evaluator);
    }

    #[test]
    fn test_action_request_without_arguments() {
        let request: ActionRequest = serde_json::from_value(json!({
            "actor": { "user_id": "hr_01", "role": "admin" },
            "action": "skip_team"
        }))
        .unwrap();
        assert_eq!(request.action, ApprovalAction::SkipTeam);
        assert!(request.expected_version.is_none());
    }

    #[test]
    fn test_work_rate_request_defaults() {
        let request: WorkRateRequest = serde_json::from_value(json!({
            "employee_id": "emp_001",
            "year": 2024,
            "month": 1
        }))
        .unwrap();
        assert!(request.daily_records.is_empty());
        assert!(request.holidays.is_none());
    }

    #[test]
    fn test_payout_request_accepts_string_amounts() {
        let request: PayoutRequest = serde_json::from_value(json!({
            "employee_id": "emp_001",
            "grade": "B",
            "base_amount": "1000000",
            "work_rate": "0.9"
        }))
        .unwrap();
        assert_eq!(request.base_amount, Decimal::from(1_000_000));
        assert_eq!(request.group_key, "");
    }
}
