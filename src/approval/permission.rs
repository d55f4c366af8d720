//! Permission policy.
//!
//! A pure function of the acting user and the request state that tells the
//! caller which workflow actions are open to them.

use serde::{Deserialize, Serialize};

use crate::models::{Actor, ApprovalRequest, ApprovalStage, Role};

/// The actions an actor may take on a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionsAllowed {
    /// Approve or reject at the team stage.
    pub can_approve_team: bool,
    /// Approve or reject at the HR stage.
    pub can_approve_hr: bool,
    /// Finalize without a team decision.
    pub can_skip: bool,
    /// Remove a rejected request.
    pub can_delete: bool,
    /// Send a rejected request back to the team stage.
    pub can_resubmit: bool,
}

/// Computes the actions open to `actor` on `request`.
///
/// Deleting requires a rejected request and an actor who is either an admin
/// or the requester.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use evaluation_engine::approval::actions_allowed;
/// use evaluation_engine::models::{
///     Actor, ApprovalRequest, ChangeAction, ChangePayload, NewApprovalRequest, RecordKind, Role,
/// };
///
/// let request = ApprovalRequest::from_submission(
///     NewApprovalRequest {
///         requester_id: "emp_001".to_string(),
///         requester_name: "김민수".to_string(),
///         approver_team_id: "lead_01".to_string(),
///         approver_hr_id: None,
///         payload: ChangePayload {
///             data_type: RecordKind::DailyAttendance,
///             action: ChangeAction::Delete,
///             data: serde_json::json!({ "unique_id": "d-1" }),
///         },
///     },
///     Utc::now(),
/// );
///
/// let lead = actions_allowed(&Actor::new("lead_01", Role::Evaluator), &request);
/// assert!(lead.can_approve_team);
/// assert!(!lead.can_skip);
///
/// let hr = actions_allowed(&Actor::new("hr_01", Role::Admin), &request);
/// assert!(hr.can_skip);
/// assert!(!hr.can_approve_hr);
/// ```
pub fn actions_allowed(actor: &Actor, request: &ApprovalRequest) -> ActionsAllowed {
    let is_admin = actor.role == Role::Admin;
    let is_requester = actor.user_id == request.requester_id;
    let is_team_approver =
        actor.role == Role::Evaluator && actor.user_id == request.approver_team_id;
    let rejected = request.stage.is_rejected();

    ActionsAllowed {
        can_approve_team: is_team_approver && request.stage == ApprovalStage::Pending,
        can_approve_hr: is_admin && request.stage == ApprovalStage::TeamApproved,
        can_skip: is_admin && request.stage == ApprovalStage::Pending,
        can_delete: (is_admin || is_requester) && rejected,
        can_resubmit: is_requester && rejected,
    }
}
