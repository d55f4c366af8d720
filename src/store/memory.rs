//! In-memory adapters for the persistence ports.
//!
//! All adapters are `Send + Sync` and guard their state with `parking_lot`
//! locks, so one instance can be shared across request handlers.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;
use uuid::Uuid;

use super::{ApprovalRequestStore, EvaluationStore, GradingScaleStore, RecordStore};
use crate::calculation::EvaluationBook;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovalRequest, AttendanceRecord, DailyAttendanceRecord, GradingScale, Period, PeriodRecords,
    RecordKind, ShortenedWorkHourRecord,
};

#[derive(Debug, Default)]
struct EmployeeRecords {
    daily: BTreeMap<String, DailyAttendanceRecord>,
    shortened: BTreeMap<String, ShortenedWorkHourRecord>,
}

/// A [`RecordStore`] backed by a map per employee.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    employees: RwLock<HashMap<String, EmployeeRecords>>,
}

impl InMemoryRecordStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records held for an employee.
    pub fn record_count(&self, employee_id: &str) -> usize {
        self.employees
            .read()
            .get(employee_id)
            .map(|records| records.daily.len() + records.shortened.len())
            .unwrap_or(0)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn upsert(&self, employee_id: &str, record: AttendanceRecord) -> EngineResult<()> {
        let mut employees = self.employees.write();
        let records = employees.entry(employee_id.to_string()).or_default();
        match record {
            AttendanceRecord::DailyAttendance(r) => {
                records.daily.insert(r.unique_id.clone(), r);
            }
            AttendanceRecord::ShortenedWorkHours(r) => {
                records.shortened.insert(r.unique_id.clone(), r);
            }
        }
        Ok(())
    }

    fn get(
        &self,
        employee_id: &str,
        kind: RecordKind,
        unique_id: &str,
    ) -> EngineResult<Option<AttendanceRecord>> {
        let employees = self.employees.read();
        let Some(records) = employees.get(employee_id) else {
            return Ok(None);
        };
        let record = match kind {
            RecordKind::DailyAttendance => records
                .daily
                .get(unique_id)
                .cloned()
                .map(AttendanceRecord::DailyAttendance),
            RecordKind::ShortenedWorkHours => records
                .shortened
                .get(unique_id)
                .cloned()
                .map(AttendanceRecord::ShortenedWorkHours),
        };
        Ok(record)
    }

    fn delete(&self, employee_id: &str, kind: RecordKind, unique_id: &str) -> EngineResult<bool> {
        let mut employees = self.employees.write();
        let Some(records) = employees.get_mut(employee_id) else {
            return Ok(false);
        };
        let removed = match kind {
            RecordKind::DailyAttendance => records.daily.remove(unique_id).is_some(),
            RecordKind::ShortenedWorkHours => records.shortened.remove(unique_id).is_some(),
        };
        Ok(removed)
    }

    fn query_by_period(&self, employee_id: &str, period: Period) -> EngineResult<PeriodRecords> {
        let employees = self.employees.read();
        let Some(records) = employees.get(employee_id) else {
            return Ok(PeriodRecords::default());
        };
        Ok(PeriodRecords {
            daily: records
                .daily
                .values()
                .filter(|r| period.contains(r.date))
                .cloned()
                .collect(),
            shortened: records
                .shortened
                .values()
                .filter(|r| period.overlaps(r.start_date, r.end_date))
                .cloned()
                .collect(),
        })
    }
}

/// A [`GradingScaleStore`] holding one replaceable scale.
#[derive(Debug, Default)]
pub struct InMemoryGradingScaleStore {
    scale: RwLock<GradingScale>,
}

impl InMemoryGradingScaleStore {
    /// Creates a store holding `scale`.
    pub fn new(scale: GradingScale) -> Self {
        Self {
            scale: RwLock::new(scale),
        }
    }

    /// Replaces the scale, as the admin screen does.
    pub fn replace(&self, scale: GradingScale) {
        *self.scale.write() = scale;
    }
}

impl GradingScaleStore for InMemoryGradingScaleStore {
    fn get(&self) -> EngineResult<GradingScale> {
        Ok(self.scale.read().clone())
    }
}

#[derive(Debug, Default)]
struct RequestTable {
    next_sequence: u64,
    requests: HashMap<Uuid, (u64, ApprovalRequest)>,
}

/// An [`ApprovalRequestStore`] that lists requests in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryApprovalRequestStore {
    table: RwLock<RequestTable>,
}

impl InMemoryApprovalRequestStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApprovalRequestStore for InMemoryApprovalRequestStore {
    fn insert(&self, request: ApprovalRequest) -> EngineResult<()> {
        let mut table = self.table.write();
        if table.requests.contains_key(&request.id) {
            return Err(EngineError::validation(
                "id",
                format!("approval request {} already exists", request.id),
            ));
        }
        let sequence = table.next_sequence;
        table.next_sequence += 1;
        table.requests.insert(request.id, (sequence, request));
        Ok(())
    }

    fn get(&self, id: Uuid) -> EngineResult<Option<ApprovalRequest>> {
        Ok(self
            .table
            .read()
            .requests
            .get(&id)
            .map(|(_, request)| request.clone()))
    }

    fn update(&self, request: ApprovalRequest) -> EngineResult<()> {
        let mut table = self.table.write();
        match table.requests.get_mut(&request.id) {
            Some((_, stored)) => {
                *stored = request;
                Ok(())
            }
            None => Err(EngineError::RequestNotFound {
                request_id: request.id,
            }),
        }
    }

    fn remove(&self, id: Uuid) -> EngineResult<bool> {
        Ok(self.table.write().requests.remove(&id).is_some())
    }

    fn list(&self) -> EngineResult<Vec<ApprovalRequest>> {
        let table = self.table.read();
        let mut entries: Vec<&(u64, ApprovalRequest)> = table.requests.values().collect();
        entries.sort_by_key(|(sequence, _)| *sequence);
        Ok(entries.into_iter().map(|(_, request)| request.clone()).collect())
    }
}

/// An [`EvaluationStore`] keeping every period's book in memory.
#[derive(Debug, Default)]
pub struct InMemoryEvaluationStore {
    books: RwLock<BTreeMap<Period, EvaluationBook>>,
}

impl InMemoryEvaluationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvaluationStore for InMemoryEvaluationStore {
    fn get(&self, period: Period) -> EngineResult<Option<EvaluationBook>> {
        Ok(self.books.read().get(&period).cloned())
    }

    fn save(&self, book: EvaluationBook) -> EngineResult<()> {
        self.books.write().insert(book.period(), book);
        Ok(())
    }
}
