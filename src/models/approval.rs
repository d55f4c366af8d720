//! Approval request models.
//!
//! A request proposes one add/edit/delete of an attendance record. Internally
//! its progress is a single [`ApprovalStage`]; the two legacy status fields
//! (`status`, `status_hr`) only appear at the serialization boundary.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attendance::validate_unique_id;
use super::{AttendanceRecord, DailyAttendanceRecord, RecordKind, ShortenedWorkHourRecord};
use crate::error::{EngineError, EngineResult};

/// Where a request stands in the two-stage sign-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStage {
    /// Waiting for the team approver.
    Pending,
    /// Team approved, waiting for HR.
    TeamApproved,
    /// HR gave final approval; the payload has been committed.
    HrApproved,
    /// Rejected by the team approver.
    RejectedTeam,
    /// Rejected by HR after team approval.
    RejectedHr,
}

impl ApprovalStage {
    /// Snake-case name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStage::Pending => "pending",
            ApprovalStage::TeamApproved => "team_approved",
            ApprovalStage::HrApproved => "hr_approved",
            ApprovalStage::RejectedTeam => "rejected_team",
            ApprovalStage::RejectedHr => "rejected_hr",
        }
    }

    /// Returns true for either rejected stage.
    pub fn is_rejected(&self) -> bool {
        matches!(self, ApprovalStage::RejectedTeam | ApprovalStage::RejectedHr)
    }

    /// Splits the stage into the legacy `(status, status_hr)` pair.
    ///
    /// # Example
    ///
    /// ```
    /// use evaluation_engine::models::{ApprovalStage, HrStatus, TeamStatus};
    ///
    /// assert_eq!(
    ///     ApprovalStage::RejectedHr.legacy_fields(),
    ///     (TeamStatus::TeamApproved, HrStatus::Rejected)
    /// );
    /// ```
    pub fn legacy_fields(&self) -> (TeamStatus, HrStatus) {
        match self {
            ApprovalStage::Pending => (TeamStatus::Pending, HrStatus::Pending),
            ApprovalStage::TeamApproved => (TeamStatus::TeamApproved, HrStatus::Pending),
            ApprovalStage::HrApproved => (TeamStatus::TeamApproved, HrStatus::FinalApproved),
            ApprovalStage::RejectedTeam => (TeamStatus::Rejected, HrStatus::Pending),
            ApprovalStage::RejectedHr => (TeamStatus::TeamApproved, HrStatus::Rejected),
        }
    }

    /// Rebuilds the stage from the legacy pair, rejecting combinations the
    /// workflow can never produce.
    pub fn from_legacy_fields(status: TeamStatus, status_hr: HrStatus) -> EngineResult<Self> {
        match (status, status_hr) {
            (TeamStatus::Pending, HrStatus::Pending) => Ok(ApprovalStage::Pending),
            (TeamStatus::TeamApproved, HrStatus::Pending) => Ok(ApprovalStage::TeamApproved),
            (TeamStatus::TeamApproved, HrStatus::FinalApproved) => Ok(ApprovalStage::HrApproved),
            (TeamStatus::Rejected, HrStatus::Pending) => Ok(ApprovalStage::RejectedTeam),
            (TeamStatus::TeamApproved, HrStatus::Rejected) => Ok(ApprovalStage::RejectedHr),
            (status, status_hr) => Err(EngineError::validation(
                "status",
                format!(
                    "inconsistent approval state: status={:?}, status_hr={:?}",
                    status, status_hr
                ),
            )),
        }
    }
}

impl fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Legacy team-stage status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamStatus {
    /// Awaiting the team approver.
    Pending,
    /// Approved by the team approver (or skipped by HR).
    TeamApproved,
    /// Rejected by the team approver.
    Rejected,
}

/// Legacy HR-stage status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrStatus {
    /// Awaiting HR.
    Pending,
    /// Finally approved by HR.
    FinalApproved,
    /// Rejected by HR.
    Rejected,
}

/// What a change request does to the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    /// Insert a new record.
    Add,
    /// Replace the record with the same key.
    Edit,
    /// Remove the record with the same key.
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Add => write!(f, "add"),
            ChangeAction::Edit => write!(f, "edit"),
            ChangeAction::Delete => write!(f, "delete"),
        }
    }
}

/// The proposed change. `data` stays opaque JSON until commit, but it is
/// checked against the typed record shape whenever it is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePayload {
    /// Which record collection the change targets.
    pub data_type: RecordKind,
    /// Insert, replace or remove.
    pub action: ChangeAction,
    /// The record (add/edit) or at least its `unique_id` (delete).
    pub data: serde_json::Value,
}

impl ChangePayload {
    /// Checks that `data` fits `data_type` and `action`.
    pub fn validate(&self) -> EngineResult<()> {
        match self.action {
            ChangeAction::Add | ChangeAction::Edit => self.record().map(|_| ()),
            ChangeAction::Delete => self.record_key().map(|_| ()),
        }
    }

    /// Parses `data` into a typed, validated record.
    pub fn record(&self) -> EngineResult<AttendanceRecord> {
        let record = match self.data_type {
            RecordKind::DailyAttendance => AttendanceRecord::DailyAttendance(
                serde_json::from_value::<DailyAttendanceRecord>(self.data.clone())
                    .map_err(|e| EngineError::validation("payload.data", e.to_string()))?,
            ),
            RecordKind::ShortenedWorkHours => AttendanceRecord::ShortenedWorkHours(
                serde_json::from_value::<ShortenedWorkHourRecord>(self.data.clone())
                    .map_err(|e| EngineError::validation("payload.data", e.to_string()))?,
            ),
        };
        record.validate()?;
        Ok(record)
    }

    /// Reads the `unique_id` of the targeted record.
    ///
    /// The key must match the stored record exactly; surrounding whitespace
    /// is rejected the same way record validation rejects it.
    pub fn record_key(&self) -> EngineResult<String> {
        let unique_id = self
            .data
            .get("unique_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| EngineError::validation("payload.data.unique_id", "missing"))?;
        validate_unique_id(unique_id).map_err(|e| match e {
            EngineError::Validation { message, .. } => {
                EngineError::validation("payload.data.unique_id", message)
            }
            other => other,
        })?;
        Ok(unique_id.to_string())
    }
}

/// The role of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// HR administrator.
    Admin,
    /// Team leader / evaluator.
    Evaluator,
    /// Regular employee.
    Employee,
}

/// The user performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The user's unique id.
    pub user_id: String,
    /// The user's role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// A new change request as submitted by an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApprovalRequest {
    /// The submitting employee; committed records are stored under this id.
    pub requester_id: String,
    /// Display name of the requester.
    pub requester_name: String,
    /// The team approver who must sign off first.
    pub approver_team_id: String,
    /// The HR approver, if one is designated.
    #[serde(default)]
    pub approver_hr_id: Option<String>,
    /// The proposed change.
    pub payload: ChangePayload,
}

/// A change request moving through the two-stage approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ApprovalRequestRecord", into = "ApprovalRequestRecord")]
pub struct ApprovalRequest {
    /// Request id.
    pub id: Uuid,
    /// The submitting employee.
    pub requester_id: String,
    /// Display name of the requester.
    pub requester_name: String,
    /// The team approver.
    pub approver_team_id: String,
    /// The HR approver, if designated.
    pub approver_hr_id: Option<String>,
    /// The date the request was submitted.
    pub date: NaiveDate,
    /// The proposed change.
    pub payload: ChangePayload,
    /// Current stage.
    pub stage: ApprovalStage,
    /// Set when HR finalized without a team decision.
    pub team_skipped: bool,
    /// When the team approved.
    pub approved_at_team: Option<DateTime<Utc>>,
    /// When HR gave final approval.
    pub approved_at_hr: Option<DateTime<Utc>>,
    /// Why the request was rejected.
    pub rejection_reason: Option<String>,
    /// Incremented on every stored change; used for optimistic concurrency.
    pub version: u64,
}

impl ApprovalRequest {
    /// Creates a pending request from a submission.
    pub fn from_submission(submission: NewApprovalRequest, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            requester_id: submission.requester_id,
            requester_name: submission.requester_name,
            approver_team_id: submission.approver_team_id,
            approver_hr_id: submission.approver_hr_id,
            date: now.date_naive(),
            payload: submission.payload,
            stage: ApprovalStage::Pending,
            team_skipped: false,
            approved_at_team: None,
            approved_at_hr: None,
            rejection_reason: None,
            version: 0,
        }
    }

    /// Legacy team-stage field.
    pub fn status(&self) -> TeamStatus {
        self.stage.legacy_fields().0
    }

    /// Legacy HR-stage field.
    pub fn status_hr(&self) -> HrStatus {
        self.stage.legacy_fields().1
    }
}

/// Serialized shape of [`ApprovalRequest`] carrying the legacy status pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApprovalRequestRecord {
    id: Uuid,
    requester_id: String,
    requester_name: String,
    approver_team_id: String,
    #[serde(default)]
    approver_hr_id: Option<String>,
    date: NaiveDate,
    payload: ChangePayload,
    status: TeamStatus,
    status_hr: HrStatus,
    #[serde(default)]
    team_skipped: bool,
    #[serde(default)]
    approved_at_team: Option<DateTime<Utc>>,
    #[serde(default)]
    approved_at_hr: Option<DateTime<Utc>>,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(default)]
    version: u64,
}

impl From<ApprovalRequest> for ApprovalRequestRecord {
    fn from(request: ApprovalRequest) -> Self {
        let (status, status_hr) = request.stage.legacy_fields();
        Self {
            id: request.id,
            requester_id: request.requester_id,
            requester_name: request.requester_name,
            approver_team_id: request.approver_team_id,
            approver_hr_id: request.approver_hr_id,
            date: request.date,
            payload: request.payload,
            status,
            status_hr,
            team_skipped: request.team_skipped,
            approved_at_team: request.approved_at_team,
            approved_at_hr: request.approved_at_hr,
            rejection_reason: request.rejection_reason,
            version: request.version,
        }
    }
}

impl TryFrom<ApprovalRequestRecord> for ApprovalRequest {
    type Error = EngineError;

    fn try_from(record: ApprovalRequestRecord) -> Result<Self, Self::Error> {
        let stage = ApprovalStage::from_legacy_fields(record.status, record.status_hr)?;
        Ok(Self {
            id: record.id,
            requester_id: record.requester_id,
            requester_name: record.requester_name,
            approver_team_id: record.approver_team_id,
            approver_hr_id: record.approver_hr_id,
            date: record.date,
            payload: record.payload,
            stage,
            team_skipped: record.team_skipped,
            approved_at_team: record.approved_at_team,
            approved_at_hr: record.approved_at_hr,
            rejection_reason: record.rejection_reason,
            version: record.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn daily_payload(action: ChangeAction) -> ChangePayload {
        ChangePayload {
            data_type: RecordKind::DailyAttendance,
            action,
            data: json!({ "unique_id": "d-1", "date": "2024-01-15", "type": "결근" }),
        }
    }

    fn create_test_request() -> ApprovalRequest {
        ApprovalRequest::from_submission(
            NewApprovalRequest {
                requester_id: "emp_001".to_string(),
                requester_name: "김민수".to_string(),
                approver_team_id: "lead_01".to_string(),
                approver_hr_id: Some("hr_01".to_string()),
                payload: daily_payload(ChangeAction::Add),
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_legacy_fields_round_trip_every_stage() {
        for stage in [
            ApprovalStage::Pending,
            ApprovalStage::TeamApproved,
            ApprovalStage::HrApproved,
            ApprovalStage::RejectedTeam,
            ApprovalStage::RejectedHr,
        ] {
            let (status, status_hr) = stage.legacy_fields();
            assert_eq!(
                ApprovalStage::from_legacy_fields(status, status_hr).unwrap(),
                stage
            );
        }
    }

    #[test]
    fn test_inconsistent_legacy_pair_is_rejected() {
        assert!(ApprovalStage::from_legacy_fields(TeamStatus::Pending, HrStatus::FinalApproved)
            .is_err());
        assert!(ApprovalStage::from_legacy_fields(TeamStatus::Rejected, HrStatus::Rejected)
            .is_err());
    }

    #[test]
    fn test_request_serializes_legacy_status_pair() {
        let mut request = create_test_request();
        request.stage = ApprovalStage::TeamApproved;
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["status"], "team_approved");
        assert_eq!(json["status_hr"], "pending");
        assert!(json.get("stage").is_none());

        let parsed: ApprovalRequest = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.stage, ApprovalStage::TeamApproved);
        assert_eq!(parsed, request);
    }

    #[test]
    fn test_new_request_starts_pending() {
        let request = create_test_request();
        assert_eq!(request.stage, ApprovalStage::Pending);
        assert_eq!(request.status(), TeamStatus::Pending);
        assert_eq!(request.status_hr(), HrStatus::Pending);
        assert_eq!(request.version, 0);
    }

    #[test]
    fn test_payload_record_parses_daily_attendance() {
        let record = daily_payload(ChangeAction::Add).record().unwrap();
        assert_eq!(record.kind(), RecordKind::DailyAttendance);
        assert_eq!(record.unique_id(), "d-1");
    }

    #[test]
    fn test_payload_rejects_shortened_record_with_inverted_times() {
        let payload = ChangePayload {
            data_type: RecordKind::ShortenedWorkHours,
            action: ChangeAction::Add,
            data: json!({
                "unique_id": "sw-1",
                "start_date": "2024-01-08",
                "end_date": "2024-01-12",
                "start_time": "15:00:00",
                "end_time": "09:00:00",
                "type": "임신"
            }),
        };
        match payload.validate() {
            Err(EngineError::Validation { field, .. }) => assert_eq!(field, "end_time"),
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_rejects_missing_field() {
        let payload = ChangePayload {
            data_type: RecordKind::DailyAttendance,
            action: ChangeAction::Edit,
            data: json!({ "unique_id": "d-1", "type": "결근" }),
        };
        match payload.validate() {
            Err(EngineError::Validation { field, message }) => {
                assert_eq!(field, "payload.data");
                assert!(message.contains("date"));
            }
            other => panic!("Expected Validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_delete_payload_needs_only_key() {
        let payload = ChangePayload {
            data_type: RecordKind::DailyAttendance,
            action: ChangeAction::Delete,
            data: json!({ "unique_id": "d-1" }),
        };
        assert!(payload.validate().is_ok());
        assert_eq!(payload.record_key().unwrap(), "d-1");

        let empty = ChangePayload {
            data: json!({ "unique_id": "  " }),
            ..payload
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_padded_key_is_rejected_for_every_action() {
        let data = json!({ "unique_id": " d-1 ", "date": "2024-01-15", "type": "결근" });
        for action in [ChangeAction::Add, ChangeAction::Edit, ChangeAction::Delete] {
            let payload = ChangePayload {
                data_type: RecordKind::DailyAttendance,
                action,
                data: data.clone(),
            };
            match payload.validate() {
                Err(EngineError::Validation { message, .. }) => {
                    assert!(message.contains("whitespace"), "{}", message)
                }
                other => panic!("Expected Validation error for {}, got {:?}", action, other),
            }
        }
    }
}
