//! Dual-stage approval state machine.
//!
//! ```text
//!            approve_team             approve_hr
//! pending ───────────────▶ team_approved ─────────▶ hr_approved (commit)
//!    │  └──────────── skip_team (admin) ───────────────▲
//!    │ reject_team                  │ reject_hr
//!    ▼                              ▼
//! rejected_team                 rejected_hr
//!    └──────── resubmit ──▶ pending ◀── resubmit ──┘
//! ```
//!
//! [`transition`] is pure: it validates an action against the current state
//! and the [permission policy](super::actions_allowed) and describes the new
//! state. Applying the result (storing it, committing the payload) is the
//! job of [`ApprovalService`](super::ApprovalService).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::notification::{HR_QUEUE_RECIPIENT, NotificationEvent};
use super::permission::actions_allowed;
use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, ApprovalRequest, ApprovalStage, ChangePayload, Role};

/// An action on an approval request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ApprovalAction {
    /// Team approver signs off.
    ApproveTeam,
    /// Team approver rejects.
    RejectTeam {
        /// Why the request was rejected.
        reason: String,
    },
    /// HR gives final approval and commits the change.
    ApproveHr,
    /// HR rejects after team approval.
    RejectHr {
        /// Why the request was rejected.
        reason: String,
    },
    /// HR finalizes without a team decision.
    SkipTeam,
    /// The requester sends a rejected request back, optionally with new data.
    Resubmit {
        /// Replacement for `payload.data`.
        #[serde(default)]
        data: Option<serde_json::Value>,
    },
    /// Remove a rejected request.
    Delete,
}

impl ApprovalAction {
    /// Snake-case action name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ApprovalAction::ApproveTeam => "approve_team",
            ApprovalAction::RejectTeam { .. } => "reject_team",
            ApprovalAction::ApproveHr => "approve_hr",
            ApprovalAction::RejectHr { .. } => "reject_hr",
            ApprovalAction::SkipTeam => "skip_team",
            ApprovalAction::Resubmit { .. } => "resubmit",
            ApprovalAction::Delete => "delete",
        }
    }
}

/// What applying a transition requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEffect {
    /// Store the new request state.
    Updated,
    /// Commit the payload to the record store, then store the new state.
    Commit,
    /// Remove the request.
    Removed,
    /// Nothing to do; the action repeated a final approval.
    Unchanged,
}

/// The result of a permitted transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionOutcome {
    /// The request after the transition (the old state for `Removed`).
    pub request: ApprovalRequest,
    /// What the caller must apply.
    pub effect: TransitionEffect,
    /// Events to hand to the notification sink.
    pub notifications: Vec<NotificationEvent>,
}

/// Validates `action` by `actor` against `request` and computes the new state.
///
/// Fails with [`EngineError::InvalidTransition`] when the state or the actor
/// does not permit the action, and with [`EngineError::Validation`] when a
/// rejection reason is blank or resubmitted data is malformed. The input
/// request is never modified.
pub fn transition(
    request: &ApprovalRequest,
    actor: &Actor,
    action: &ApprovalAction,
    now: DateTime<Utc>,
) -> EngineResult<TransitionOutcome> {
    let allowed = actions_allowed(actor, request);
    let mut next = request.clone();
    let mut notifications = Vec::new();

    let effect = match action {
        ApprovalAction::ApproveTeam => {
            ensure_team_decision(request, actor, action, allowed.can_approve_team)?;
            next.stage = ApprovalStage::TeamApproved;
            next.approved_at_team = Some(now);
            notifications.push(NotificationEvent::new(
                hr_recipient(request),
                format!("{}'s request awaits HR approval", request.requester_name),
                request.id,
            ));
            TransitionEffect::Updated
        }
        ApprovalAction::RejectTeam { reason } => {
            ensure_team_decision(request, actor, action, allowed.can_approve_team)?;
            next.stage = ApprovalStage::RejectedTeam;
            next.rejection_reason = Some(validate_reason(reason)?);
            notifications.push(rejection_notice(request, "team approver", reason));
            TransitionEffect::Updated
        }
        ApprovalAction::ApproveHr if request.stage == ApprovalStage::HrApproved && actor.role == Role::Admin => {
            info!(request_id = %request.id, "Request already finally approved; nothing to commit");
            TransitionEffect::Unchanged
        }
        ApprovalAction::ApproveHr => {
            ensure_hr_decision(request, actor, action, allowed.can_approve_hr)?;
            next.stage = ApprovalStage::HrApproved;
            next.approved_at_hr = Some(now);
            notifications.push(final_approval_notice(request));
            TransitionEffect::Commit
        }
        ApprovalAction::RejectHr { reason } => {
            ensure_hr_decision(request, actor, action, allowed.can_approve_hr)?;
            next.stage = ApprovalStage::RejectedHr;
            next.rejection_reason = Some(validate_reason(reason)?);
            notifications.push(rejection_notice(request, "HR", reason));
            TransitionEffect::Updated
        }
        ApprovalAction::SkipTeam => {
            if !allowed.can_skip {
                let reason = if actor.role != Role::Admin {
                    "only an admin may skip the team stage"
                } else {
                    "the team stage can only be skipped while the request is pending"
                };
                return Err(deny(request, action, reason));
            }
            next.stage = ApprovalStage::HrApproved;
            next.team_skipped = true;
            next.approved_at_hr = Some(now);
            notifications.push(final_approval_notice(request));
            TransitionEffect::Commit
        }
        ApprovalAction::Resubmit { data } => {
            if !allowed.can_resubmit {
                return Err(deny(request, action, closed_reason(request, actor, "resubmit")));
            }
            if let Some(data) = data {
                next.payload = ChangePayload {
                    data: data.clone(),
                    ..request.payload.clone()
                };
            }
            next.payload.validate()?;
            next.stage = ApprovalStage::Pending;
            next.team_skipped = false;
            next.rejection_reason = None;
            next.approved_at_team = None;
            next.approved_at_hr = None;
            notifications.push(NotificationEvent::new(
                request.approver_team_id.clone(),
                format!("{} resubmitted a request", request.requester_name),
                request.id,
            ));
            TransitionEffect::Updated
        }
        ApprovalAction::Delete => {
            if !allowed.can_delete {
                return Err(deny(request, action, closed_reason(request, actor, "delete")));
            }
            TransitionEffect::Removed
        }
    };

    if matches!(effect, TransitionEffect::Updated | TransitionEffect::Commit) {
        next.version += 1;
    }

    info!(
        request_id = %request.id,
        actor = %actor.user_id,
        action = action.name(),
        from = %request.stage,
        to = %next.stage,
        "Approval transition"
    );

    Ok(TransitionOutcome {
        request: next,
        effect,
        notifications,
    })
}

fn deny(request: &ApprovalRequest, action: &ApprovalAction, reason: &str) -> EngineError {
    warn!(
        request_id = %request.id,
        stage = %request.stage,
        action = action.name(),
        reason,
        "Approval transition rejected"
    );
    EngineError::InvalidTransition {
        request_id: request.id,
        stage: request.stage.to_string(),
        action: action.name().to_string(),
        reason: reason.to_string(),
    }
}

fn ensure_team_decision(
    request: &ApprovalRequest,
    actor: &Actor,
    action: &ApprovalAction,
    allowed: bool,
) -> EngineResult<()> {
    if allowed {
        return Ok(());
    }
    let reason = if request.stage != ApprovalStage::Pending {
        "the request is not awaiting a team decision"
    } else if actor.user_id != request.approver_team_id {
        "only the designated team approver may decide the team stage"
    } else {
        "the team approver must act as an evaluator"
    };
    Err(deny(request, action, reason))
}

fn ensure_hr_decision(
    request: &ApprovalRequest,
    actor: &Actor,
    action: &ApprovalAction,
    allowed: bool,
) -> EngineResult<()> {
    if allowed {
        return Ok(());
    }
    let reason = if request.stage != ApprovalStage::TeamApproved {
        "the request is not awaiting an HR decision"
    } else if actor.role != Role::Admin {
        "only an admin may decide the HR stage"
    } else {
        "the HR stage is closed"
    };
    Err(deny(request, action, reason))
}

fn closed_reason(request: &ApprovalRequest, actor: &Actor, verb: &str) -> &'static str {
    if !request.stage.is_rejected() {
        return "only a rejected request can be changed this way";
    }
    match (verb, actor.user_id == request.requester_id) {
        ("resubmit", false) => "only the requester may resubmit",
        _ => "only the requester or an admin may delete",
    }
}

fn validate_reason(reason: &str) -> EngineResult<String> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(EngineError::validation("reason", "a rejection reason is required"));
    }
    Ok(reason.to_string())
}

fn hr_recipient(request: &ApprovalRequest) -> String {
    request
        .approver_hr_id
        .clone()
        .unwrap_or_else(|| HR_QUEUE_RECIPIENT.to_string())
}

fn rejection_notice(request: &ApprovalRequest, by: &str, reason: &str) -> NotificationEvent {
    NotificationEvent::new(
        request.requester_id.clone(),
        format!("Your request was rejected by {}: {}", by, reason.trim()),
        request.id,
    )
}

fn final_approval_notice(request: &ApprovalRequest) -> NotificationEvent {
    NotificationEvent::new(
        request.requester_id.clone(),
        format!(
            "Your {} {} request was approved and applied",
            request.payload.data_type, request.payload.action
        ),
        request.id,
    )
}
