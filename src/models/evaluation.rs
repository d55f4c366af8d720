//! Derived evaluation models.
//!
//! [`WorkRateSummary`] is recomputed on demand from the raw records and is
//! never a source of truth. [`EvaluationResult`] is the per-employee aggregate
//! that grading and work-rate changes feed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Grade, Period};

/// Deducted hours split by record category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionBreakdown {
    /// Hours deducted by daily attendance exceptions.
    pub attendance: Decimal,
    /// Hours deducted by pregnancy shortened-work periods.
    pub pregnancy: Decimal,
    /// Hours deducted by childcare/family-care shortened-work periods.
    pub care: Decimal,
}

impl DeductionBreakdown {
    /// Sum over all categories.
    pub fn total(&self) -> Decimal {
        self.attendance + self.pregnancy + self.care
    }
}

/// Work-rate figures for one employee and one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRateSummary {
    /// The employee the summary belongs to.
    pub employee_id: String,
    /// The month the summary covers.
    pub period: Period,
    /// Weekdays in the month that are not holidays.
    pub business_days: u32,
    /// `business_days × 8`.
    pub standard_hours: Decimal,
    /// Deducted hours per category.
    pub deduction_hours: DeductionBreakdown,
    /// Sum of all deductions.
    pub total_deduction_hours: Decimal,
    /// `max(0, standard_hours − total_deduction_hours)`.
    pub total_work_hours: Decimal,
    /// `total_work_hours / standard_hours`, or zero when there are no business days.
    pub monthly_work_rate: Decimal,
}

/// The evaluation outcome of one employee in one evaluation period.
///
/// `grade_amount = base_amount × payout_rate_percent / 100` and
/// `final_amount = grade_amount × work_rate`, both rounded to whole won.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The evaluated employee.
    pub employee_id: String,
    /// Assigned grade, `None` until graded or when not gradeable.
    pub grade: Option<Grade>,
    /// Score of the grade (zero when ungraded).
    pub score: Decimal,
    /// Payout rate of the grade in percent (zero when ungraded).
    pub payout_rate_percent: Decimal,
    /// Amount the payout rate applies to.
    pub base_amount: Decimal,
    /// Base amount scaled by the payout rate.
    pub grade_amount: Decimal,
    /// Work rate in `[0, 1]` used to pro-rate the grade amount.
    pub work_rate: Decimal,
    /// Amount paid out.
    pub final_amount: Decimal,
    /// The evaluation group the employee belongs to.
    pub group_key: String,
}

impl EvaluationResult {
    /// Creates an ungraded result for an employee entering an evaluation period.
    pub fn new(
        employee_id: impl Into<String>,
        group_key: impl Into<String>,
        base_amount: Decimal,
        work_rate: Decimal,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            grade: None,
            score: Decimal::ZERO,
            payout_rate_percent: Decimal::ZERO,
            base_amount,
            grade_amount: Decimal::ZERO,
            work_rate,
            final_amount: Decimal::ZERO,
            group_key: group_key.into(),
        }
    }
}
