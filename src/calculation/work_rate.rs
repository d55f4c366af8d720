//! Work-rate aggregator.
//!
//! Sums every deduction of one employee for one month and derives the
//! monthly work rate:
//!
//! ```text
//! total_work_hours  = max(0, standard_hours − total_deduction_hours)
//! monthly_work_rate = total_work_hours / standard_hours   (0 when standard_hours = 0)
//! ```
//!
//! The aggregator is a pure function of its inputs and is safe to call on
//! every recompute.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{
    AttendanceTypeTable, AuditStep, AuditTrace, DailyAttendanceRecord, DeductionBreakdown,
    HolidayCalendar, Period, ShortenedWorkHourRecord, ShortenedWorkType, WorkRateSummary,
};

use super::business_calendar::calculate_business_calendar;
use super::deduction::{resolve_daily_attendance, resolve_shortened_work};

/// A work-rate summary together with the audit trace that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRateResult {
    /// The derived figures.
    pub summary: WorkRateSummary,
    /// Every step taken, plus warnings such as unknown attendance types.
    pub audit_trace: AuditTrace,
}

/// Computes the monthly work rate of one employee.
///
/// Records outside `period` are ignored, so callers may pass an employee's
/// full record history. Shortened-work ranges are clipped to the month.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::calculate_work_rate;
/// use evaluation_engine::models::{
///     AttendanceType, AttendanceTypeTable, DailyAttendanceRecord, HolidayCalendar, Period,
/// };
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let types = AttendanceTypeTable::new(vec![AttendanceType {
///     id: "absence".to_string(),
///     name: "결근".to_string(),
///     deduction_days: Decimal::ONE,
/// }])
/// .unwrap();
/// let holidays: HolidayCalendar = [NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]
///     .into_iter()
///     .collect();
/// let daily = vec![DailyAttendanceRecord {
///     unique_id: "d-1".to_string(),
///     date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
///     attendance_type: "결근".to_string(),
/// }];
///
/// let result = calculate_work_rate(
///     "emp_001",
///     Period::new(2024, 1).unwrap(),
///     &daily,
///     &[],
///     &types,
///     &holidays,
/// );
/// assert_eq!(result.summary.standard_hours, Decimal::from(176));
/// assert_eq!(result.summary.total_work_hours, Decimal::from(168));
/// ```
pub fn calculate_work_rate(
    employee_id: &str,
    period: Period,
    daily_records: &[DailyAttendanceRecord],
    shortened_records: &[ShortenedWorkHourRecord],
    attendance_types: &AttendanceTypeTable,
    holidays: &HolidayCalendar,
) -> WorkRateResult {
    let mut trace = AuditTrace::default();

    let calendar = calculate_business_calendar(period, holidays, trace.next_step_number());
    let standard_hours = calendar.standard_hours;
    trace.steps.push(calendar.audit_step);

    let mut deductions = DeductionBreakdown::default();

    for record in daily_records.iter().filter(|r| period.contains(r.date)) {
        let result = resolve_daily_attendance(record, attendance_types, trace.next_step_number());
        deductions.attendance += result.hours;
        trace.steps.push(result.audit_step);
        trace.warnings.extend(result.warning);
    }

    for record in shortened_records
        .iter()
        .filter(|r| period.overlaps(r.start_date, r.end_date))
    {
        let result = resolve_shortened_work(record, period, holidays, trace.next_step_number());
        match record.work_type {
            ShortenedWorkType::Pregnancy => deductions.pregnancy += result.hours,
            ShortenedWorkType::Care => deductions.care += result.hours,
        }
        trace.steps.push(result.audit_step);
    }

    let total_deduction_hours = deductions.total();
    let total_work_hours = (standard_hours - total_deduction_hours).max(Decimal::ZERO);
    let monthly_work_rate = if standard_hours > Decimal::ZERO {
        total_work_hours / standard_hours
    } else {
        Decimal::ZERO
    };

    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "work_rate_aggregation".to_string(),
        rule_name: "Monthly Work Rate".to_string(),
        input: serde_json::json!({
            "standard_hours": standard_hours.normalize().to_string(),
            "attendance_hours": deductions.attendance.normalize().to_string(),
            "pregnancy_hours": deductions.pregnancy.normalize().to_string(),
            "care_hours": deductions.care.normalize().to_string(),
        }),
        output: serde_json::json!({
            "total_deduction_hours": total_deduction_hours.normalize().to_string(),
            "total_work_hours": total_work_hours.normalize().to_string(),
            "monthly_work_rate": monthly_work_rate.normalize().to_string(),
        }),
        reasoning: if standard_hours > Decimal::ZERO {
            format!(
                "max(0, {}h − {}h) / {}h = {}",
                standard_hours.normalize(),
                total_deduction_hours.normalize(),
                standard_hours.normalize(),
                monthly_work_rate.round_dp(4).normalize()
            )
        } else {
            format!("{} has no business days; work rate is 0", period)
        },
    });

    debug!(
        employee_id = %employee_id,
        period = %period,
        total_deduction_hours = %total_deduction_hours,
        monthly_work_rate = %monthly_work_rate,
        "Work rate calculated"
    );

    WorkRateResult {
        summary: WorkRateSummary {
            employee_id: employee_id.to_string(),
            period,
            business_days: calendar.business_days,
            standard_hours,
            deduction_hours: deductions,
            total_deduction_hours,
            total_work_hours,
            monthly_work_rate,
        },
        audit_trace: trace,
    }
}
