//! Persistence ports and their in-memory adapters.
//!
//! The core never owns persistent state. Record, grading-scale, approval
//! request and evaluation storage are reached through the traits below, which
//! the services and the HTTP layer receive as `Arc<dyn …>` values.

mod memory;

pub use memory::{
    InMemoryApprovalRequestStore, InMemoryEvaluationStore, InMemoryGradingScaleStore,
    InMemoryRecordStore,
};

use uuid::Uuid;

use crate::calculation::EvaluationBook;
use crate::error::EngineResult;
use crate::models::{ApprovalRequest, AttendanceRecord, GradingScale, Period, PeriodRecords, RecordKind};

/// Storage for committed attendance records, keyed by employee.
///
/// Only the approval workflow's commit step writes through this port; the
/// work-rate pipeline reads from it.
pub trait RecordStore: Send + Sync {
    /// Inserts a record, or replaces the record with the same kind and key.
    fn upsert(&self, employee_id: &str, record: AttendanceRecord) -> EngineResult<()>;

    /// Looks up a record by kind and key.
    fn get(
        &self,
        employee_id: &str,
        kind: RecordKind,
        unique_id: &str,
    ) -> EngineResult<Option<AttendanceRecord>>;

    /// Removes a record. Returns false if it did not exist.
    fn delete(&self, employee_id: &str, kind: RecordKind, unique_id: &str) -> EngineResult<bool>;

    /// Returns the records of an employee that touch a period.
    fn query_by_period(&self, employee_id: &str, period: Period) -> EngineResult<PeriodRecords>;
}

/// Read access to the current grading scale.
pub trait GradingScaleStore: Send + Sync {
    /// Returns the current grading scale.
    fn get(&self) -> EngineResult<GradingScale>;
}

/// Storage for approval requests.
pub trait ApprovalRequestStore: Send + Sync {
    /// Stores a new request. Fails if the id is taken.
    fn insert(&self, request: ApprovalRequest) -> EngineResult<()>;

    /// Looks up a request.
    fn get(&self, id: Uuid) -> EngineResult<Option<ApprovalRequest>>;

    /// Replaces a stored request. Fails with `RequestNotFound` if it is missing.
    fn update(&self, request: ApprovalRequest) -> EngineResult<()>;

    /// Removes a request. Returns false if it did not exist.
    fn remove(&self, id: Uuid) -> EngineResult<bool>;

    /// Returns every stored request, oldest first.
    fn list(&self) -> EngineResult<Vec<ApprovalRequest>>;
}

/// Storage for evaluation books, one per period.
pub trait EvaluationStore: Send + Sync {
    /// Returns the book of a period, if one was saved.
    fn get(&self, period: Period) -> EngineResult<Option<EvaluationBook>>;

    /// Inserts or replaces the book of `book.period()`.
    fn save(&self, book: EvaluationBook) -> EngineResult<()>;
}
