//! Approval service.
//!
//! Applies workflow transitions to stored requests and commits finally
//! approved payloads to the record store. Every read-validate-write cycle
//! runs under one lock, so two approvers racing on the same request cannot
//! both commit.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::notification::{NotificationEvent, NotificationSink};
use super::permission::{ActionsAllowed, actions_allowed};
use super::workflow::{ApprovalAction, TransitionEffect, transition};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Actor, ApprovalRequest, ApprovalStage, AttendanceRecord, ChangeAction, ChangePayload,
    NewApprovalRequest, Period, RecordKind,
};
use crate::store::{ApprovalRequestStore, RecordStore};

/// A change written to the record store by a final approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedChange {
    /// The employee whose records changed.
    pub employee_id: String,
    /// Which collection changed.
    pub kind: RecordKind,
    /// What was done.
    pub action: ChangeAction,
    /// The record key.
    pub unique_id: String,
    /// Months whose work rate must be recomputed, in order.
    pub affected_periods: Vec<Period>,
}

/// The result of an applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// The request after the action (its last state if it was deleted).
    pub request: ApprovalRequest,
    /// What the action did.
    pub effect: TransitionEffect,
    /// The committed change, for final approvals.
    pub committed: Option<CommittedChange>,
}

/// A validated change waiting to be written.
#[derive(Debug)]
struct PlannedCommit {
    change: CommittedChange,
    write: RecordWrite,
}

#[derive(Debug)]
enum RecordWrite {
    Upsert(AttendanceRecord),
    Delete,
}

/// Runs the approval workflow against the injected stores.
pub struct ApprovalService {
    records: Arc<dyn RecordStore>,
    requests: Arc<dyn ApprovalRequestStore>,
    notifications: Arc<dyn NotificationSink>,
    write_lock: Mutex<()>,
}

impl ApprovalService {
    /// Creates a service over the given stores.
    pub fn new(
        records: Arc<dyn RecordStore>,
        requests: Arc<dyn ApprovalRequestStore>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            records,
            requests,
            notifications,
            write_lock: Mutex::new(()),
        }
    }

    /// Validates and stores a new pending request, then notifies the team approver.
    pub fn submit(
        &self,
        submission: NewApprovalRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<ApprovalRequest> {
        require_non_empty("requester_id", &submission.requester_id)?;
        require_non_empty("approver_team_id", &submission.approver_team_id)?;
        submission.payload.validate()?;

        let request = ApprovalRequest::from_submission(submission, now);
        self.requests.insert(request.clone())?;

        info!(
            request_id = %request.id,
            requester_id = %request.requester_id,
            data_type = %request.payload.data_type,
            action = %request.payload.action,
            "Approval request submitted"
        );
        self.notifications.notify(NotificationEvent::new(
            request.approver_team_id.clone(),
            format!("{} submitted a request for approval", request.requester_name),
            request.id,
        ));

        Ok(request)
    }

    /// Fetches a request.
    pub fn get(&self, id: Uuid) -> EngineResult<ApprovalRequest> {
        self.requests
            .get(id)?
            .ok_or(EngineError::RequestNotFound { request_id: id })
    }

    /// The actions `actor` may take on a request.
    pub fn permissions(&self, id: Uuid, actor: &Actor) -> EngineResult<ActionsAllowed> {
        Ok(actions_allowed(actor, &self.get(id)?))
    }

    /// Applies an action to a stored request.
    ///
    /// When `expected_version` is given and differs from the stored version
    /// the action fails with [`EngineError::VersionConflict`]. A final
    /// approval is checked against the record store first, then the request
    /// is stored, then the record is written. If that write fails the
    /// request is restored, so a failed commit leaves both stores unchanged.
    pub fn act(
        &self,
        id: Uuid,
        actor: &Actor,
        action: &ApprovalAction,
        expected_version: Option<u64>,
        now: DateTime<Utc>,
    ) -> EngineResult<TransitionReport> {
        let _guard = self.write_lock.lock();

        let current = self.get(id)?;
        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(EngineError::VersionConflict {
                    request_id: id,
                    expected,
                    actual: current.version,
                });
            }
        }

        let outcome = transition(&current, actor, action, now)?;
        let committed = match outcome.effect {
            TransitionEffect::Commit => {
                let planned = self.plan_commit(&current.requester_id, &current.payload)?;
                self.requests.update(outcome.request.clone())?;
                match self.apply_commit(planned) {
                    Ok(change) => Some(change),
                    Err(err) => {
                        if let Err(rollback) = self.requests.update(current.clone()) {
                            warn!(
                                request_id = %id,
                                error = %rollback,
                                "Failed to restore request after commit error"
                            );
                        }
                        return Err(err);
                    }
                }
            }
            TransitionEffect::Updated => {
                self.requests.update(outcome.request.clone())?;
                None
            }
            TransitionEffect::Removed => {
                self.requests.remove(id)?;
                None
            }
            TransitionEffect::Unchanged => None,
        };

        for event in outcome.notifications {
            self.notifications.notify(event);
        }

        Ok(TransitionReport {
            request: outcome.request,
            effect: outcome.effect,
            committed,
        })
    }

    /// Every stored request, oldest first.
    pub fn list(&self) -> EngineResult<Vec<ApprovalRequest>> {
        self.requests.list()
    }

    /// Pending requests the given user must decide at the team stage.
    pub fn team_queue(&self, approver_id: &str) -> EngineResult<Vec<ApprovalRequest>> {
        self.filtered(|r| r.stage == ApprovalStage::Pending && r.approver_team_id == approver_id)
    }

    /// Team-approved requests awaiting HR.
    pub fn hr_queue(&self) -> EngineResult<Vec<ApprovalRequest>> {
        self.filtered(|r| r.stage == ApprovalStage::TeamApproved)
    }

    /// Every request submitted by an employee.
    pub fn requested_by(&self, requester_id: &str) -> EngineResult<Vec<ApprovalRequest>> {
        self.filtered(|r| r.requester_id == requester_id)
    }

    fn filtered<F>(&self, predicate: F) -> EngineResult<Vec<ApprovalRequest>>
    where
        F: Fn(&ApprovalRequest) -> bool,
    {
        Ok(self.requests.list()?.into_iter().filter(|r| predicate(r)).collect())
    }

    /// Checks a payload against the record store and works out the write.
    ///
    /// Nothing is written here, so a failure leaves every store untouched.
    fn plan_commit(&self, employee_id: &str, payload: &ChangePayload) -> EngineResult<PlannedCommit> {
        let kind = payload.data_type;
        let mut periods = BTreeSet::new();

        let (unique_id, write) = match payload.action {
            ChangeAction::Add => {
                let record = payload.record()?;
                if self.records.get(employee_id, kind, record.unique_id())?.is_some() {
                    return Err(EngineError::validation(
                        "payload.data.unique_id",
                        format!("record '{}' already exists", record.unique_id()),
                    ));
                }
                periods.extend(record.affected_periods());
                (record.unique_id().to_string(), RecordWrite::Upsert(record))
            }
            ChangeAction::Edit => {
                let record = payload.record()?;
                let unique_id = record.unique_id().to_string();
                let existing = self.existing(employee_id, kind, &unique_id)?;
                periods.extend(existing.affected_periods());
                periods.extend(record.affected_periods());
                (unique_id, RecordWrite::Upsert(record))
            }
            ChangeAction::Delete => {
                let unique_id = payload.record_key()?;
                let existing = self.existing(employee_id, kind, &unique_id)?;
                periods.extend(existing.affected_periods());
                (unique_id, RecordWrite::Delete)
            }
        };

        Ok(PlannedCommit {
            change: CommittedChange {
                employee_id: employee_id.to_string(),
                kind,
                action: payload.action,
                unique_id,
                affected_periods: periods.into_iter().collect(),
            },
            write,
        })
    }

    fn apply_commit(&self, planned: PlannedCommit) -> EngineResult<CommittedChange> {
        let PlannedCommit { change, write } = planned;
        match write {
            RecordWrite::Upsert(record) => self.records.upsert(&change.employee_id, record)?,
            RecordWrite::Delete => {
                self.records
                    .delete(&change.employee_id, change.kind, &change.unique_id)?;
            }
        }

        info!(
            employee_id = %change.employee_id,
            kind = %change.kind,
            action = %change.action,
            unique_id = %change.unique_id,
            "Attendance change committed"
        );
        Ok(change)
    }

    fn existing(
        &self,
        employee_id: &str,
        kind: RecordKind,
        unique_id: &str,
    ) -> EngineResult<AttendanceRecord> {
        self.records
            .get(employee_id, kind, unique_id)?
            .ok_or_else(|| EngineError::RecordNotFound {
                employee_id: employee_id.to_string(),
                unique_id: unique_id.to_string(),
            })
    }
}

fn require_non_empty(field: &str, value: &str) -> EngineResult<()> {
    if value.trim().is_empty() {
        return Err(EngineError::validation(field, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::notification::OutboxNotificationSink;
    use crate::models::{PeriodRecords, Role};
    use crate::store::{InMemoryApprovalRequestStore, InMemoryRecordStore};
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        service: ApprovalService,
        records: Arc<InMemoryRecordStore>,
        outbox: Arc<OutboxNotificationSink>,
    }

    fn create_fixture() -> Fixture {
        let records = Arc::new(InMemoryRecordStore::new());
        let outbox = Arc::new(OutboxNotificationSink::new());
        let service = ApprovalService::new(
            records.clone(),
            Arc::new(InMemoryApprovalRequestStore::new()),
            outbox.clone(),
        );
        Fixture {
            service,
            records,
            outbox,
        }
    }

    fn submission(action: ChangeAction, data: serde_json::Value) -> NewApprovalRequest {
        NewApprovalRequest {
            requester_id: "emp_001".to_string(),
            requester_name: "김민수".to_string(),
            approver_team_id: "lead_01".to_string(),
            approver_hr_id: Some("hr_01".to_string()),
            payload: ChangePayload {
                data_type: RecordKind::DailyAttendance,
                action,
                data,
            },
        }
    }

    fn absence(day: &str) -> serde_json::Value {
        json!({ "unique_id": "d-1", "date": day, "type": "결근" })
    }

    fn lead() -> Actor {
        Actor::new("lead_01", Role::Evaluator)
    }

    fn admin() -> Actor {
        Actor::new("hr_01", Role::Admin)
    }

    fn requester() -> Actor {
        Actor::new("emp_001", Role::Employee)
    }

    fn approve_fully(fixture: &Fixture, id: Uuid) -> TransitionReport {
        fixture
            .service
            .act(id, &lead(), &ApprovalAction::ApproveTeam, None, Utc::now())
            .unwrap();
        fixture
            .service
            .act(id, &admin(), &ApprovalAction::ApproveHr, None, Utc::now())
            .unwrap()
    }

    // ==========================================================================
    // AS-001: Final approval commits the record exactly once
    // ==========================================================================
    #[test]
    fn test_as_001_final_approval_commits_once() {
        let fixture = create_fixture();
        let request = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        assert_eq!(fixture.records.record_count("emp_001"), 0);

        let report = approve_fully(&fixture, request.id);
        let change = report.committed.unwrap();
        assert_eq!(change.unique_id, "d-1");
        assert_eq!(change.affected_periods, vec![Period::new(2024, 1).unwrap()]);
        assert_eq!(fixture.records.record_count("emp_001"), 1);

        let repeat = fixture
            .service
            .act(request.id, &admin(), &ApprovalAction::ApproveHr, None, Utc::now())
            .unwrap();
        assert_eq!(repeat.effect, TransitionEffect::Unchanged);
        assert!(repeat.committed.is_none());
        assert_eq!(fixture.records.record_count("emp_001"), 1);
    }

    // ==========================================================================
    // AS-002: Scenario - reject with reason, then resubmit
    // ==========================================================================
    #[test]
    fn test_as_002_reject_and_resubmit() {
        let fixture = create_fixture();
        let request = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();

        let rejected = fixture
            .service
            .act(
                request.id,
                &lead(),
                &ApprovalAction::RejectTeam {
                    reason: "불충분".to_string(),
                },
                None,
                Utc::now(),
            )
            .unwrap();
        assert_eq!(rejected.request.rejection_reason.as_deref(), Some("불충분"));

        let resubmitted = fixture
            .service
            .act(
                request.id,
                &requester(),
                &ApprovalAction::Resubmit {
                    data: Some(absence("2024-01-16")),
                },
                None,
                Utc::now(),
            )
            .unwrap();
        let stored = fixture.service.get(request.id).unwrap();
        assert_eq!(stored, resubmitted.request);
        assert_eq!(stored.stage, ApprovalStage::Pending);
        assert!(stored.rejection_reason.is_none());
        assert_eq!(stored.payload.data, absence("2024-01-16"));
        assert_eq!(fixture.records.record_count("emp_001"), 0);
    }

    #[test]
    fn test_submit_notifies_team_approver() {
        let fixture = create_fixture();
        fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        let events = fixture.outbox.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].recipient_id, "lead_01");
    }

    #[test]
    fn test_submit_rejects_invalid_payload() {
        let fixture = create_fixture();
        let result = fixture.service.submit(
            NewApprovalRequest {
                payload: ChangePayload {
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
                },
                ..submission(ChangeAction::Add, json!({}))
            },
            Utc::now(),
        );
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_version_conflict() {
        let fixture = create_fixture();
        let request = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        fixture
            .service
            .act(request.id, &lead(), &ApprovalAction::ApproveTeam, Some(0), Utc::now())
            .unwrap();

        let result = fixture
            .service
            .act(request.id, &admin(), &ApprovalAction::ApproveHr, Some(0), Utc::now());
        assert!(matches!(
            result,
            Err(EngineError::VersionConflict {
                expected: 0,
                actual: 1,
                ..
            })
        ));
        assert_eq!(fixture.records.record_count("emp_001"), 0);
    }

    #[test]
    fn test_edit_and_delete_of_missing_record_fail_without_state_change() {
        let fixture = create_fixture();
        for action in [ChangeAction::Edit, ChangeAction::Delete] {
            let request = fixture
                .service
                .submit(submission(action, absence("2024-01-15")), Utc::now())
                .unwrap();
            let result = fixture
                .service
                .act(request.id, &admin(), &ApprovalAction::SkipTeam, None, Utc::now());
            assert!(matches!(result, Err(EngineError::RecordNotFound { .. })));
            assert_eq!(
                fixture.service.get(request.id).unwrap().stage,
                ApprovalStage::Pending
            );
        }
    }

    #[test]
    fn test_edit_reports_old_and_new_periods() {
        let fixture = create_fixture();
        let add = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-31")), Utc::now())
            .unwrap();
        approve_fully(&fixture, add.id);

        let edit = fixture
            .service
            .submit(submission(ChangeAction::Edit, absence("2024-02-01")), Utc::now())
            .unwrap();
        let report = approve_fully(&fixture, edit.id);
        assert_eq!(
            report.committed.unwrap().affected_periods,
            vec![Period::new(2024, 1).unwrap(), Period::new(2024, 2).unwrap()]
        );

        let delete = fixture
            .service
            .submit(submission(ChangeAction::Delete, json!({ "unique_id": "d-1" })), Utc::now())
            .unwrap();
        approve_fully(&fixture, delete.id);
        assert_eq!(fixture.records.record_count("emp_001"), 0);
    }

    #[test]
    fn test_duplicate_add_is_rejected_at_commit() {
        let fixture = create_fixture();
        let first = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        approve_fully(&fixture, first.id);

        let second = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        let result = fixture
            .service
            .act(second.id, &admin(), &ApprovalAction::SkipTeam, None, Utc::now());
        assert!(matches!(result, Err(EngineError::Validation { .. })));
        assert_eq!(fixture.records.record_count("emp_001"), 1);
    }

    #[test]
    fn test_queues() {
        let fixture = create_fixture();
        let a = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        let b = fixture
            .service
            .submit(submission(ChangeAction::Delete, json!({ "unique_id": "d-9" })), Utc::now())
            .unwrap();
        fixture
            .service
            .act(a.id, &lead(), &ApprovalAction::ApproveTeam, None, Utc::now())
            .unwrap();

        let team: Vec<Uuid> = fixture.service.team_queue("lead_01").unwrap().iter().map(|r| r.id).collect();
        assert_eq!(team, vec![b.id]);
        let hr: Vec<Uuid> = fixture.service.hr_queue().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(hr, vec![a.id]);
        assert_eq!(fixture.service.requested_by("emp_001").unwrap().len(), 2);
        assert!(fixture.service.team_queue("lead_02").unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_request() {
        let fixture = create_fixture();
        let request = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        fixture
            .service
            .act(
                request.id,
                &lead(),
                &ApprovalAction::RejectTeam {
                    reason: "중복".to_string(),
                },
                None,
                Utc::now(),
            )
            .unwrap();
        let report = fixture
            .service
            .act(request.id, &requester(), &ApprovalAction::Delete, None, Utc::now())
            .unwrap();
        assert_eq!(report.effect, TransitionEffect::Removed);
        assert!(matches!(
            fixture.service.get(request.id),
            Err(EngineError::RequestNotFound { .. })
        ));
    }

    #[test]
    fn test_concurrent_final_approvals_commit_once() {
        let fixture = Arc::new(create_fixture());
        let request = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        fixture
            .service
            .act(request.id, &lead(), &ApprovalAction::ApproveTeam, None, Utc::now())
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let fixture = fixture.clone();
                std::thread::spawn(move || {
                    fixture
                        .service
                        .act(request.id, &admin(), &ApprovalAction::ApproveHr, Some(1), Utc::now())
                        .is_ok()
                })
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(fixture.records.record_count("emp_001"), 1);
    }

    struct FlakyRecordStore {
        inner: InMemoryRecordStore,
        fail_writes: AtomicBool,
    }

    impl RecordStore for FlakyRecordStore {
        fn upsert(&self, employee_id: &str, record: AttendanceRecord) -> EngineResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(EngineError::validation("store", "write failed"));
            }
            self.inner.upsert(employee_id, record)
        }

        fn get(
            &self,
            employee_id: &str,
            kind: RecordKind,
            unique_id: &str,
        ) -> EngineResult<Option<AttendanceRecord>> {
            self.inner.get(employee_id, kind, unique_id)
        }

        fn delete(&self, employee_id: &str, kind: RecordKind, unique_id: &str) -> EngineResult<bool> {
            self.inner.delete(employee_id, kind, unique_id)
        }

        fn query_by_period(&self, employee_id: &str, period: Period) -> EngineResult<PeriodRecords> {
            self.inner.query_by_period(employee_id, period)
        }
    }

    struct FlakyRequestStore {
        inner: InMemoryApprovalRequestStore,
        fail_updates: AtomicBool,
    }

    impl ApprovalRequestStore for FlakyRequestStore {
        fn insert(&self, request: ApprovalRequest) -> EngineResult<()> {
            self.inner.insert(request)
        }

        fn get(&self, id: Uuid) -> EngineResult<Option<ApprovalRequest>> {
            self.inner.get(id)
        }

        fn update(&self, request: ApprovalRequest) -> EngineResult<()> {
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(EngineError::validation("store", "update failed"));
            }
            self.inner.update(request)
        }

        fn remove(&self, id: Uuid) -> EngineResult<bool> {
            self.inner.remove(id)
        }

        fn list(&self) -> EngineResult<Vec<ApprovalRequest>> {
            self.inner.list()
        }
    }

    // ==========================================================================
    // AS-003: A failed request update writes no record, and a retry commits once
    // ==========================================================================
    #[test]
    fn test_as_003_failed_request_update_writes_no_record() {
        let records = Arc::new(InMemoryRecordStore::new());
        let requests = Arc::new(FlakyRequestStore {
            inner: InMemoryApprovalRequestStore::new(),
            fail_updates: AtomicBool::new(false),
        });
        let service = ApprovalService::new(
            records.clone(),
            requests.clone(),
            Arc::new(OutboxNotificationSink::new()),
        );
        let request = service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        service
            .act(request.id, &lead(), &ApprovalAction::ApproveTeam, None, Utc::now())
            .unwrap();

        requests.fail_updates.store(true, Ordering::SeqCst);
        let failed = service.act(request.id, &admin(), &ApprovalAction::ApproveHr, None, Utc::now());
        assert!(failed.is_err());
        assert_eq!(records.record_count("emp_001"), 0);
        assert_eq!(service.get(request.id).unwrap().stage, ApprovalStage::TeamApproved);

        requests.fail_updates.store(false, Ordering::SeqCst);
        let retried = service
            .act(request.id, &admin(), &ApprovalAction::ApproveHr, None, Utc::now())
            .unwrap();
        assert_eq!(retried.effect, TransitionEffect::Commit);
        assert_eq!(records.record_count("emp_001"), 1);
    }

    // ==========================================================================
    // AS-004: A failed record write restores the request
    // ==========================================================================
    #[test]
    fn test_as_004_failed_record_write_restores_request() {
        let records = Arc::new(FlakyRecordStore {
            inner: InMemoryRecordStore::new(),
            fail_writes: AtomicBool::new(true),
        });
        let service = ApprovalService::new(
            records.clone(),
            Arc::new(InMemoryApprovalRequestStore::new()),
            Arc::new(OutboxNotificationSink::new()),
        );
        let request = service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        service
            .act(request.id, &lead(), &ApprovalAction::ApproveTeam, None, Utc::now())
            .unwrap();

        let failed = service.act(request.id, &admin(), &ApprovalAction::ApproveHr, Some(1), Utc::now());
        assert!(failed.is_err());
        let stored = service.get(request.id).unwrap();
        assert_eq!(stored.stage, ApprovalStage::TeamApproved);
        assert_eq!(stored.version, 1);

        records.fail_writes.store(false, Ordering::SeqCst);
        service
            .act(request.id, &admin(), &ApprovalAction::ApproveHr, Some(1), Utc::now())
            .unwrap();
        assert_eq!(records.inner.record_count("emp_001"), 1);
    }

    #[test]
    fn test_padded_key_cannot_be_submitted() {
        let fixture = create_fixture();
        for action in [ChangeAction::Add, ChangeAction::Delete] {
            let result = fixture.service.submit(
                submission(
                    action,
                    json!({ "unique_id": " d-1 ", "date": "2024-01-15", "type": "결근" }),
                ),
                Utc::now(),
            );
            assert!(matches!(result, Err(EngineError::Validation { .. })));
        }

        let added = fixture
            .service
            .submit(submission(ChangeAction::Add, absence("2024-01-15")), Utc::now())
            .unwrap();
        fixture
            .service
            .act(added.id, &admin(), &ApprovalAction::SkipTeam, None, Utc::now())
            .unwrap();
        let deleted = fixture
            .service
            .submit(submission(ChangeAction::Delete, json!({ "unique_id": "d-1" })), Utc::now())
            .unwrap();
        fixture
            .service
            .act(deleted.id, &admin(), &ApprovalAction::SkipTeam, None, Utc::now())
            .unwrap();
        assert_eq!(fixture.records.record_count("emp_001"), 0);
    }
}
