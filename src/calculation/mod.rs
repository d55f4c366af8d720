//! Calculation logic for the evaluation engine.
//!
//! This module contains the derivation pipeline: business-day counting,
//! per-record deduction resolution, monthly work-rate aggregation, grade
//! payout calculation and the evaluation book that keeps payouts in step
//! with grades and work rates.

mod business_calendar;
mod deduction;
mod evaluation;
mod payout;
mod work_rate;

pub use business_calendar::{
    BusinessCalendarResult, STANDARD_DAILY_HOURS, business_day_count, business_days_between,
    calculate_business_calendar, count_business_days, is_business_day, standard_monthly_hours,
};
pub use deduction::{
    DailyDeductionResult, ShortenedWorkDeductionResult, resolve_daily_attendance,
    resolve_shortened_work,
};
pub use evaluation::{
    EvaluationBook, EvaluationUpdate, GroupScoreOverage, SCORE_BUDGET_PER_MEMBER,
    check_group_score, recompute_evaluation,
};
pub use payout::{
    GradeRates, MIN_GRADEABLE_WORK_RATE, PayoutResult, calculate_payout, final_amount,
    grade_amount, is_gradeable, round_to_won, score_and_payout_rate,
};
pub use work_rate::{WorkRateResult, calculate_work_rate};
