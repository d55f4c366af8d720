//! Application state for the evaluation engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::approval::{ApprovalService, NotificationSink, TracingNotificationSink};
use crate::config::{ConfigLoader, EngineConfig};
use crate::evaluation::EvaluationService;
use crate::store::{
    ApprovalRequestStore, EvaluationStore, GradingScaleStore, InMemoryApprovalRequestStore,
    InMemoryEvaluationStore, InMemoryGradingScaleStore, InMemoryRecordStore, RecordStore,
};

/// Shared application state.
///
/// Holds the loaded configuration, the persistence ports and the approval
/// and evaluation services built on top of them.
#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
    records: Arc<dyn RecordStore>,
    grading: Arc<dyn GradingScaleStore>,
    approvals: Arc<ApprovalService>,
    evaluations: Arc<EvaluationService>,
}

impl AppState {
    /// Creates a state backed by in-memory stores, logging notifications.
    pub fn new(config: ConfigLoader) -> Self {
        let config = config.into_config();
        let grading = Arc::new(InMemoryGradingScaleStore::new(config.grading_scale().clone()));
        Self::with_stores(
            config,
            Arc::new(InMemoryRecordStore::new()),
            Arc::new(InMemoryApprovalRequestStore::new()),
            grading,
            Arc::new(InMemoryEvaluationStore::new()),
            Arc::new(TracingNotificationSink),
        )
    }

    /// Creates a state over caller-supplied stores.
    pub fn with_stores(
        config: EngineConfig,
        records: Arc<dyn RecordStore>,
        requests: Arc<dyn ApprovalRequestStore>,
        grading: Arc<dyn GradingScaleStore>,
        evaluations: Arc<dyn EvaluationStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let approvals = Arc::new(ApprovalService::new(records.clone(), requests, notifications));
        let evaluations = Arc::new(EvaluationService::new(evaluations, grading.clone()));
        Self {
            config: Arc::new(config),
            records,
            grading,
            approvals,
            evaluations,
        }
    }

    /// The loaded configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The committed attendance records.
    pub fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    /// The current grading scale.
    pub fn grading(&self) -> &dyn GradingScaleStore {
        self.grading.as_ref()
    }

    /// The approval workflow.
    pub fn approvals(&self) -> &ApprovalService {
        &self.approvals
    }

    /// The stored evaluation periods.
    pub fn evaluations(&self) -> &EvaluationService {
        &self.evaluations
    }
}
