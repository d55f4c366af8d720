//! Payout calculator.
//!
//! Maps a grade to its score and payout rate, scales the base amount by the
//! payout rate and pro-rates the result by the work rate. Amounts are rounded
//! to whole won (midpoint away from zero) where they are computed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::models::{AuditStep, AuditWarning, Grade, GradingScale, WARNING_NOT_GRADEABLE};

/// Work rates below this value make an employee not gradeable.
pub const MIN_GRADEABLE_WORK_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Score and payout rate looked up for a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeRates {
    /// Score of the grade.
    pub score: Decimal,
    /// Payout rate in percent.
    pub payout_rate_percent: Decimal,
}

/// The payout figures for one employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutResult {
    /// The grade that was applied (`None` when ungraded or not gradeable).
    pub grade: Option<Grade>,
    /// Score of the applied grade.
    pub score: Decimal,
    /// Payout rate of the applied grade, in percent.
    pub payout_rate_percent: Decimal,
    /// `base_amount × payout_rate_percent / 100`, rounded to won.
    pub grade_amount: Decimal,
    /// `grade_amount × work_rate`, rounded to won.
    pub final_amount: Decimal,
    /// False when the work rate is below [`MIN_GRADEABLE_WORK_RATE`].
    pub gradeable: bool,
    /// Set when a requested grade was dropped because the employee is not gradeable.
    pub warning: Option<AuditWarning>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Rounds an amount to the nearest whole won, midpoint away from zero.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::round_to_won;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_to_won(Decimal::from_str("1234.5").unwrap()), Decimal::from(1235));
/// assert_eq!(round_to_won(Decimal::from_str("1234.49").unwrap()), Decimal::from(1234));
/// ```
pub fn round_to_won(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if an employee with this work rate may receive a grade.
pub fn is_gradeable(work_rate: Decimal) -> bool {
    work_rate >= MIN_GRADEABLE_WORK_RATE
}

/// Looks up score and payout rate. No grade means zero for both.
///
/// Fails with [`EngineError::UnknownGrade`](crate::error::EngineError::UnknownGrade)
/// when the grade is not in the scale.
pub fn score_and_payout_rate(grade: Option<&Grade>, scale: &GradingScale) -> EngineResult<GradeRates> {
    match grade {
        None => Ok(GradeRates {
            score: Decimal::ZERO,
            payout_rate_percent: Decimal::ZERO,
        }),
        Some(grade) => {
            let definition = scale.definition(grade)?;
            Ok(GradeRates {
                score: definition.score,
                payout_rate_percent: definition.payout_rate_percent,
            })
        }
    }
}

/// `base_amount × payout_rate_percent / 100`, rounded to won.
pub fn grade_amount(base_amount: Decimal, payout_rate_percent: Decimal) -> Decimal {
    round_to_won(base_amount * payout_rate_percent / HUNDRED)
}

/// `grade_amount × work_rate`, rounded to won.
pub fn final_amount(grade_amount: Decimal, work_rate: Decimal) -> Decimal {
    round_to_won(grade_amount * work_rate)
}

/// Calculates the payout for a grade, base amount and work rate.
///
/// When the work rate is below [`MIN_GRADEABLE_WORK_RATE`] the grade is
/// ignored and every figure is zero; a warning is attached if a grade was
/// requested.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::calculate_payout;
/// use evaluation_engine::models::{Grade, GradeDefinition, GradingScale};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let mut scale = GradingScale::default();
/// scale
///     .insert(
///         Grade::from("B"),
///         GradeDefinition {
///             score: Decimal::from(100),
///             payout_rate_percent: Decimal::from(100),
///             description: String::new(),
///         },
///     )
///     .unwrap();
///
/// let result = calculate_payout(
///     Some(&Grade::from("B")),
///     Decimal::from(1_000_000),
///     Decimal::from_str("0.9").unwrap(),
///     &scale,
///     1,
/// )
/// .unwrap();
/// assert_eq!(result.grade_amount, Decimal::from(1_000_000));
/// assert_eq!(result.final_amount, Decimal::from(900_000));
/// ```
pub fn calculate_payout(
    grade: Option<&Grade>,
    base_amount: Decimal,
    work_rate: Decimal,
    scale: &GradingScale,
    step_number: u32,
) -> EngineResult<PayoutResult> {
    let gradeable = is_gradeable(work_rate);
    let applied_grade = if gradeable { grade } else { None };
    let rates = score_and_payout_rate(applied_grade, scale)?;

    let grade_amount = grade_amount(base_amount, rates.payout_rate_percent);
    let final_amount = final_amount(grade_amount, work_rate);

    let warning = match (gradeable, grade) {
        (false, Some(requested)) => Some(AuditWarning::new(
            WARNING_NOT_GRADEABLE,
            format!(
                "Grade '{}' ignored: work rate {} is below {}",
                requested,
                work_rate.round_dp(4).normalize(),
                MIN_GRADEABLE_WORK_RATE
            ),
            "high",
        )),
        _ => None,
    };

    let reasoning = if !gradeable {
        format!(
            "Work rate {} is below {}; not gradeable, payout is 0",
            work_rate.round_dp(4).normalize(),
            MIN_GRADEABLE_WORK_RATE
        )
    } else {
        match applied_grade {
            Some(g) => format!(
                "Grade '{}' pays {}% of {} = {}; × work rate {} = {}",
                g,
                rates.payout_rate_percent.normalize(),
                base_amount.normalize(),
                grade_amount,
                work_rate.round_dp(4).normalize(),
                final_amount
            ),
            None => "No grade assigned; payout is 0".to_string(),
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "payout_calculation".to_string(),
        rule_name: "Grade Payout".to_string(),
        input: serde_json::json!({
            "grade": grade.map(|g| g.to_string()),
            "base_amount": base_amount.normalize().to_string(),
            "work_rate": work_rate.normalize().to_string(),
        }),
        output: serde_json::json!({
            "gradeable": gradeable,
            "score": rates.score.normalize().to_string(),
            "payout_rate_percent": rates.payout_rate_percent.normalize().to_string(),
            "grade_amount": grade_amount.to_string(),
            "final_amount": final_amount.to_string(),
        }),
        reasoning,
    };

    Ok(PayoutResult {
        grade: applied_grade.cloned(),
        score: rates.score,
        payout_rate_percent: rates.payout_rate_percent,
        grade_amount,
        final_amount,
        gradeable,
        warning,
        audit_step,
    })
}
