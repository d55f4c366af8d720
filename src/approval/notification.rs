//! Notification events emitted by workflow transitions.
//!
//! Delivery is fire-and-forget: a sink may drop events, and the workflow never
//! waits on it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Recipient used for HR notifications when no HR approver is designated.
pub const HR_QUEUE_RECIPIENT: &str = "hr_queue";

/// A message for one user about one approval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Who should be told.
    pub recipient_id: String,
    /// What happened.
    pub message: String,
    /// The request concerned.
    pub request_id: Uuid,
}

impl NotificationEvent {
    /// Creates an event.
    pub fn new(recipient_id: impl Into<String>, message: impl Into<String>, request_id: Uuid) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            message: message.into(),
            request_id,
        }
    }
}

/// Receives notification events.
pub trait NotificationSink: Send + Sync {
    /// Hands an event to the sink.
    fn notify(&self, event: NotificationEvent);
}

/// Collects events in memory until drained.
#[derive(Debug, Default)]
pub struct OutboxNotificationSink {
    events: Mutex<Vec<NotificationEvent>>,
}

impl OutboxNotificationSink {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the queued events.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().clone()
    }

    /// Removes and returns the queued events.
    pub fn drain(&self) -> Vec<NotificationEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl NotificationSink for OutboxNotificationSink {
    fn notify(&self, event: NotificationEvent) {
        self.events.lock().push(event);
    }
}

/// Writes events to the log and discards them.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationSink;

impl NotificationSink for TracingNotificationSink {
    fn notify(&self, event: NotificationEvent) {
        info!(
            recipient_id = %event.recipient_id,
            request_id = %event.request_id,
            message = %event.message,
            "Notification"
        );
    }
}
