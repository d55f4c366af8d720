//! Business calendar: business days and standard monthly hours.
//!
//! A business day is a Monday-to-Friday date that is not a declared holiday.
//! Standard monthly hours are `business days × 8`.

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{AuditStep, HolidayCalendar, Period};

/// Standard working hours in one business day.
pub const STANDARD_DAILY_HOURS: Decimal = Decimal::from_parts(8, 0, 0, false, 0);

/// Business-day figures for one month, with the audit step that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessCalendarResult {
    /// The month counted.
    pub period: Period,
    /// Weekdays that are not holidays.
    pub business_days: u32,
    /// `business_days × 8`.
    pub standard_hours: Decimal,
    /// The audit step recording this count.
    pub audit_step: AuditStep,
}

/// Returns true if `date` is a weekday and not a holiday.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::is_business_day;
/// use evaluation_engine::models::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let holidays: HolidayCalendar = [NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]
///     .into_iter()
///     .collect();
///
/// assert!(!is_business_day(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), &holidays)); // 신정
/// assert!(is_business_day(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), &holidays));
/// assert!(!is_business_day(NaiveDate::from_ymd_opt(2024, 1, 6).unwrap(), &holidays)); // Saturday
/// ```
pub fn is_business_day(date: NaiveDate, holidays: &HolidayCalendar) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.is_holiday(date)
}

/// Returns the business days in the inclusive range `[start, end]`.
///
/// The range is not bounded to a month; an empty vector is returned when
/// `end < start`.
pub fn business_days_between(
    start: NaiveDate,
    end: NaiveDate,
    holidays: &HolidayCalendar,
) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| is_business_day(*d, holidays))
        .collect()
}

/// Counts the business days of a month.
///
/// Fails only when `year`/`month` does not name a calendar month.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::business_day_count;
/// use evaluation_engine::models::HolidayCalendar;
/// use chrono::NaiveDate;
///
/// let holidays: HolidayCalendar = [NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()]
///     .into_iter()
///     .collect();
///
/// assert_eq!(business_day_count(2024, 1, &holidays).unwrap(), 22);
/// ```
pub fn business_day_count(year: i32, month: u32, holidays: &HolidayCalendar) -> EngineResult<u32> {
    let period = Period::new(year, month)?;
    Ok(count_business_days(period, holidays))
}

/// Standard hours of a month: `business_day_count × 8`.
pub fn standard_monthly_hours(
    year: i32,
    month: u32,
    holidays: &HolidayCalendar,
) -> EngineResult<Decimal> {
    let days = business_day_count(year, month, holidays)?;
    Ok(Decimal::from(days) * STANDARD_DAILY_HOURS)
}

/// Counts the business days of an already validated period.
pub fn count_business_days(period: Period, holidays: &HolidayCalendar) -> u32 {
    period
        .days()
        .filter(|d| is_business_day(*d, holidays))
        .count() as u32
}

/// Counts business days and standard hours for a month, recording an audit step.
pub fn calculate_business_calendar(
    period: Period,
    holidays: &HolidayCalendar,
    step_number: u32,
) -> BusinessCalendarResult {
    let business_days = count_business_days(period, holidays);
    let standard_hours = Decimal::from(business_days) * STANDARD_DAILY_HOURS;
    let weekday_holidays: Vec<String> = holidays
        .in_period(period)
        .into_iter()
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|d| d.to_string())
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "business_day_count".to_string(),
        rule_name: "Business Day Count".to_string(),
        input: serde_json::json!({
            "period": period.to_string(),
            "weekday_holidays": weekday_holidays,
        }),
        output: serde_json::json!({
            "business_days": business_days,
            "standard_hours": standard_hours.normalize().to_string(),
        }),
        reasoning: format!(
            "{} has {} business days after excluding {} weekday holiday(s): {} × {}h = {}h",
            period,
            business_days,
            weekday_holidays.len(),
            business_days,
            STANDARD_DAILY_HOURS,
            standard_hours.normalize()
        ),
    };

    BusinessCalendarResult {
        period,
        business_days,
        standard_hours,
        audit_step,
    }
}
