//! Dual-stage approval of attendance changes.
//!
//! A change request passes a team stage and an HR stage before its payload
//! is committed to the record store. The [permission policy](actions_allowed)
//! decides who may act, the [state machine](transition) decides what each
//! action does, and [`ApprovalService`] applies it atomically.

mod notification;
mod permission;
mod service;
mod workflow;

pub use notification::{
    HR_QUEUE_RECIPIENT, NotificationEvent, NotificationSink, OutboxNotificationSink,
    TracingNotificationSink,
};
pub use permission::{ActionsAllowed, actions_allowed};
pub use service::{ApprovalService, CommittedChange, TransitionReport};
pub use workflow::{ApprovalAction, TransitionEffect, TransitionOutcome, transition};
