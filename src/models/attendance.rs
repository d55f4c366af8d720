//! Attendance exception records and the attendance-type table.
//!
//! These are the raw inputs the work-rate pipeline consumes. They are the
//! source of truth for every derived [`WorkRateSummary`](super::WorkRateSummary).

use std::collections::HashMap;
use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Period;
use crate::error::{EngineError, EngineResult};

/// A configured attendance exception type with its full-day-equivalent deduction.
///
/// # Example
///
/// ```
/// use evaluation_engine::models::AttendanceType;
/// use rust_decimal::Decimal;
///
/// let half_day = AttendanceType {
///     id: "half_am".to_string(),
///     name: "오전반차".to_string(),
///     deduction_days: Decimal::new(5, 1),
/// };
/// assert_eq!(half_day.deduction_days.to_string(), "0.5");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceType {
    /// Stable identifier of the type.
    pub id: String,
    /// Display name; daily records reference types by this name.
    pub name: String,
    /// Deduction in days applied once per matching daily record (may be fractional).
    pub deduction_days: Decimal,
}

/// Attendance types keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AttendanceTypeTable {
    by_name: HashMap<String, AttendanceType>,
}

impl AttendanceTypeTable {
    /// Builds the table, rejecting duplicate names and negative deductions.
    pub fn new(types: Vec<AttendanceType>) -> EngineResult<Self> {
        let mut by_name = HashMap::with_capacity(types.len());
        for attendance_type in types {
            if attendance_type.deduction_days < Decimal::ZERO {
                return Err(EngineError::validation(
                    "deduction_days",
                    format!(
                        "attendance type '{}' has a negative deduction",
                        attendance_type.name
                    ),
                ));
            }
            let name = attendance_type.name.clone();
            if by_name.insert(name.clone(), attendance_type).is_some() {
                return Err(EngineError::validation(
                    "name",
                    format!("attendance type '{}' is defined twice", name),
                ));
            }
        }
        Ok(Self { by_name })
    }

    /// Looks up the deduction in days for a type name.
    ///
    /// Fails with [`EngineError::UnknownAttendanceType`] when the name is not
    /// configured; callers on the calculation path turn this into a warning.
    pub fn deduction_days(&self, name: &str) -> EngineResult<Decimal> {
        self.by_name
            .get(name)
            .map(|t| t.deduction_days)
            .ok_or_else(|| EngineError::UnknownAttendanceType {
                name: name.to_string(),
            })
    }

    /// Returns the type with the given name, if configured.
    pub fn get(&self, name: &str) -> Option<&AttendanceType> {
        self.by_name.get(name)
    }

    /// Iterates all configured types in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &AttendanceType> {
        self.by_name.values()
    }

    /// The number of configured types.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if no types are configured.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// One full-day (or fractional-day) attendance exception.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAttendanceRecord {
    /// Record key, unique per employee and record kind.
    pub unique_id: String,
    /// The exception day.
    pub date: NaiveDate,
    /// Name of the [`AttendanceType`] this record references.
    #[serde(rename = "type")]
    pub attendance_type: String,
}

impl DailyAttendanceRecord {
    /// Checks the record shape before it can enter a change request.
    pub fn validate(&self) -> EngineResult<()> {
        validate_unique_id(&self.unique_id)?;
        if self.attendance_type.trim().is_empty() {
            return Err(EngineError::validation("type", "must not be empty"));
        }
        Ok(())
    }
}

/// Checks a record key. Keys are matched exactly, so surrounding whitespace
/// is rejected rather than trimmed.
pub(crate) fn validate_unique_id(unique_id: &str) -> EngineResult<()> {
    if unique_id.trim().is_empty() {
        return Err(EngineError::validation("unique_id", "must not be empty"));
    }
    if unique_id.trim() != unique_id {
        return Err(EngineError::validation(
            "unique_id",
            format!("'{}' has leading or trailing whitespace", unique_id),
        ));
    }
    Ok(())
}

/// The reason a shortened-work period was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShortenedWorkType {
    /// Shortened hours during pregnancy.
    #[serde(rename = "임신")]
    Pregnancy,
    /// Shortened hours for childcare or family care.
    #[serde(rename = "육아/돌봄")]
    Care,
}

impl fmt::Display for ShortenedWorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortenedWorkType::Pregnancy => write!(f, "임신"),
            ShortenedWorkType::Care => write!(f, "육아/돌봄"),
        }
    }
}

/// A contiguous date range during which the employee works a reduced daily
/// window `[start_time, end_time)` instead of the standard day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenedWorkHourRecord {
    /// Record key, unique per employee and record kind.
    pub unique_id: String,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// Start of the reduced daily window.
    pub start_time: NaiveTime,
    /// End of the reduced daily window.
    pub end_time: NaiveTime,
    /// Why the hours were shortened.
    #[serde(rename = "type")]
    pub work_type: ShortenedWorkType,
}

impl ShortenedWorkHourRecord {
    /// Hours actually worked on each day of the range.
    ///
    /// # Example
    ///
    /// ```
    /// use evaluation_engine::models::{ShortenedWorkHourRecord, ShortenedWorkType};
    /// use chrono::{NaiveDate, NaiveTime};
    /// use rust_decimal::Decimal;
    ///
    /// let record = ShortenedWorkHourRecord {
    ///     unique_id: "sw-1".to_string(),
    ///     start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
    ///     end_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
    ///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    ///     end_time: NaiveTime::from_hms_opt(15, 30, 0).unwrap(),
    ///     work_type: ShortenedWorkType::Care,
    /// };
    /// assert_eq!(record.daily_hours(), Decimal::new(65, 1));
    /// ```
    pub fn daily_hours(&self) -> Decimal {
        let minutes = (self.end_time - self.start_time).num_minutes();
        Decimal::new(minutes, 0) / Decimal::new(60, 0)
    }

    /// Returns every month the range touches.
    pub fn affected_periods(&self) -> Vec<Period> {
        Period::spanning(self.start_date, self.end_date)
    }

    /// Checks the record shape before it can enter a change request.
    pub fn validate(&self) -> EngineResult<()> {
        validate_unique_id(&self.unique_id)?;
        if self.end_date < self.start_date {
            return Err(EngineError::validation(
                "end_date",
                format!(
                    "end date {} is before start date {}",
                    self.end_date, self.start_date
                ),
            ));
        }
        if self.end_time <= self.start_time {
            return Err(EngineError::validation(
                "end_time",
                format!(
                    "end time {} must be after start time {}",
                    self.end_time, self.start_time
                ),
            ));
        }
        Ok(())
    }
}

/// The two kinds of attendance-affecting record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// [`DailyAttendanceRecord`].
    DailyAttendance,
    /// [`ShortenedWorkHourRecord`].
    ShortenedWorkHours,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::DailyAttendance => write!(f, "daily_attendance"),
            RecordKind::ShortenedWorkHours => write!(f, "shortened_work_hours"),
        }
    }
}

/// Either kind of attendance record, as held by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum AttendanceRecord {
    /// A daily attendance exception.
    DailyAttendance(DailyAttendanceRecord),
    /// A shortened-work-hours period.
    ShortenedWorkHours(ShortenedWorkHourRecord),
}

impl AttendanceRecord {
    /// The record key.
    pub fn unique_id(&self) -> &str {
        match self {
            AttendanceRecord::DailyAttendance(r) => &r.unique_id,
            AttendanceRecord::ShortenedWorkHours(r) => &r.unique_id,
        }
    }

    /// Which collection the record belongs to.
    pub fn kind(&self) -> RecordKind {
        match self {
            AttendanceRecord::DailyAttendance(_) => RecordKind::DailyAttendance,
            AttendanceRecord::ShortenedWorkHours(_) => RecordKind::ShortenedWorkHours,
        }
    }

    /// Returns every month whose work rate depends on this record.
    pub fn affected_periods(&self) -> Vec<Period> {
        match self {
            AttendanceRecord::DailyAttendance(r) => vec![Period::containing(r.date)],
            AttendanceRecord::ShortenedWorkHours(r) => r.affected_periods(),
        }
    }

    /// Returns true if the record contributes to `period`.
    pub fn touches(&self, period: Period) -> bool {
        match self {
            AttendanceRecord::DailyAttendance(r) => period.contains(r.date),
            AttendanceRecord::ShortenedWorkHours(r) => period.overlaps(r.start_date, r.end_date),
        }
    }

    /// Validates the wrapped record.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            AttendanceRecord::DailyAttendance(r) => r.validate(),
            AttendanceRecord::ShortenedWorkHours(r) => r.validate(),
        }
    }
}

/// The records of one employee that touch one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecords {
    /// Daily attendance exceptions dated inside the period.
    #[serde(default)]
    pub daily: Vec<DailyAttendanceRecord>,
    /// Shortened-work periods overlapping the period.
    #[serde(default)]
    pub shortened: Vec<ShortenedWorkHourRecord>,
}
