//! Deduction resolver.
//!
//! Converts a single attendance exception into deducted hours. Daily
//! attendance records deduct `deduction_days × 8`; shortened-work records
//! deduct `max(0, 8 − worked hours)` for each business day of the range that
//! falls inside the requested month.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    AttendanceTypeTable, AuditStep, AuditWarning, DailyAttendanceRecord, HolidayCalendar, Period,
    ShortenedWorkHourRecord, WARNING_UNKNOWN_ATTENDANCE_TYPE,
};

use super::business_calendar::{STANDARD_DAILY_HOURS, business_days_between};

/// The deduction of one daily attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyDeductionResult {
    /// Deducted hours (zero for an unknown type).
    pub hours: Decimal,
    /// Set when the record's type is not configured.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this deduction.
    pub audit_step: AuditStep,
}

/// The deduction of one shortened-work record within one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenedWorkDeductionResult {
    /// Deducted hours over the clipped range.
    pub hours: Decimal,
    /// Business days of the range that fall in the month.
    pub business_days: u32,
    /// Hours deducted per business day.
    pub daily_deduction: Decimal,
    /// The audit step recording this deduction.
    pub audit_step: AuditStep,
}

/// Resolves a daily attendance record into deducted hours.
///
/// An unknown attendance type deducts nothing and yields a warning, so an
/// unmapped type never aborts an evaluation load but is still reported.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::resolve_daily_attendance;
/// use evaluation_engine::models::{AttendanceType, AttendanceTypeTable, DailyAttendanceRecord};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let types = AttendanceTypeTable::new(vec![AttendanceType {
///     id: "absence".to_string(),
///     name: "결근".to_string(),
///     deduction_days: Decimal::ONE,
/// }])
/// .unwrap();
/// let record = DailyAttendanceRecord {
///     unique_id: "d-1".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
///     attendance_type: "결근".to_string(),
/// };
///
/// let result = resolve_daily_attendance(&record, &types, 1);
/// assert_eq!(result.hours, Decimal::from(8));
/// assert!(result.warning.is_none());
/// ```
pub fn resolve_daily_attendance(
    record: &DailyAttendanceRecord,
    attendance_types: &AttendanceTypeTable,
    step_number: u32,
) -> DailyDeductionResult {
    let (deduction_days, warning) = match attendance_types.deduction_days(&record.attendance_type)
    {
        Ok(days) => (days, None),
        Err(err) => {
            warn!(
                record_id = %record.unique_id,
                attendance_type = %record.attendance_type,
                "Unknown attendance type, deducting zero hours"
            );
            (
                Decimal::ZERO,
                Some(AuditWarning::new(
                    WARNING_UNKNOWN_ATTENDANCE_TYPE,
                    format!("{} (record '{}' on {})", err, record.unique_id, record.date),
                    "medium",
                )),
            )
        }
    };

    let hours = deduction_days * STANDARD_DAILY_HOURS;

    let reasoning = if warning.is_some() {
        format!(
            "Attendance type '{}' is not configured; no deduction applied",
            record.attendance_type
        )
    } else {
        format!(
            "'{}' on {}: {} day(s) × {}h = {}h deducted",
            record.attendance_type,
            record.date,
            deduction_days.normalize(),
            STANDARD_DAILY_HOURS,
            hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "daily_attendance_deduction".to_string(),
        rule_name: "Daily Attendance Deduction".to_string(),
        input: serde_json::json!({
            "unique_id": record.unique_id,
            "date": record.date.to_string(),
            "type": record.attendance_type,
        }),
        output: serde_json::json!({
            "deduction_days": deduction_days.normalize().to_string(),
            "hours": hours.normalize().to_string(),
            "known_type": warning.is_none(),
        }),
        reasoning,
    };

    DailyDeductionResult {
        hours,
        warning,
        audit_step,
    }
}

/// Resolves the part of a shortened-work record that falls inside `period`.
///
/// The record's range is clipped to the month first, so a range spanning
/// several months is resolved once per month. `end_time > start_time` is
/// guaranteed by payload validation and is not re-checked here.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::resolve_shortened_work;
/// use evaluation_engine::models::{HolidayCalendar, Period, ShortenedWorkHourRecord, ShortenedWorkType};
/// use chrono::{NaiveDate, NaiveTime};
/// use rust_decimal::Decimal;
///
/// // Mon 8 Jan .. Fri 12 Jan 2024, working 09:00-15:00
/// let record = ShortenedWorkHourRecord {
///     unique_id: "sw-1".to_string(),
///     start_date: NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
///     end_date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
///     start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///     end_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
///     work_type: ShortenedWorkType::Pregnancy,
/// };
///
/// let result = resolve_shortened_work(
///     &record,
///     Period::new(2024, 1).unwrap(),
///     &HolidayCalendar::default(),
///     1,
/// );
/// assert_eq!(result.business_days, 5);
/// assert_eq!(result.hours, Decimal::from(10));
/// ```
pub fn resolve_shortened_work(
    record: &ShortenedWorkHourRecord,
    period: Period,
    holidays: &HolidayCalendar,
    step_number: u32,
) -> ShortenedWorkDeductionResult {
    let actual_hours = record.daily_hours();
    let daily_deduction = (STANDARD_DAILY_HOURS - actual_hours).max(Decimal::ZERO);

    let clipped = period.clip(record.start_date, record.end_date);
    let business_days = clipped
        .map(|(start, end)| business_days_between(start, end, holidays).len() as u32)
        .unwrap_or(0);
    let hours = daily_deduction * Decimal::from(business_days);

    let reasoning = match clipped {
        Some((start, end)) => format!(
            "{} {}–{} ({}h/day) from {} to {}: {} business day(s) × {}h = {}h deducted",
            record.work_type,
            record.start_time.format("%H:%M"),
            record.end_time.format("%H:%M"),
            actual_hours.normalize(),
            start,
            end,
            business_days,
            daily_deduction.normalize(),
            hours.normalize()
        ),
        None => format!(
            "Range {} to {} does not overlap {}; no deduction",
            record.start_date, record.end_date, period
        ),
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "shortened_work_deduction".to_string(),
        rule_name: "Shortened Work Hours Deduction".to_string(),
        input: serde_json::json!({
            "unique_id": record.unique_id,
            "type": record.work_type.to_string(),
            "period": period.to_string(),
            "start_date": record.start_date.to_string(),
            "end_date": record.end_date.to_string(),
            "start_time": record.start_time.format("%H:%M").to_string(),
            "end_time": record.end_time.format("%H:%M").to_string(),
        }),
        output: serde_json::json!({
            "actual_hours": actual_hours.normalize().to_string(),
            "daily_deduction": daily_deduction.normalize().to_string(),
            "business_days": business_days,
            "hours": hours.normalize().to_string(),
        }),
        reasoning,
    };

    ShortenedWorkDeductionResult {
        hours,
        business_days,
        daily_deduction,
        audit_step,
    }
}
