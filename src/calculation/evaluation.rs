//! Evaluation book.
//!
//! Holds the [`EvaluationResult`] of every employee in one evaluation period
//! and keeps the derived payout fields consistent whenever a grade is assigned
//! or an approved attendance change moves an employee's work rate.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::payout::{PayoutResult, calculate_payout};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditWarning, EvaluationResult, Grade, GradingScale, Period,
    WARNING_GRADE_REMOVED, WARNING_GROUP_SCORE_OVERAGE,
};

/// Score budget per group member.
pub const SCORE_BUDGET_PER_MEMBER: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// A group whose summed scores exceed `members × 100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupScoreOverage {
    /// The evaluation group.
    pub group_key: String,
    /// Number of members in the group, graded or not.
    pub member_count: usize,
    /// Sum of member scores.
    pub total_score: Decimal,
    /// `member_count × 100`.
    pub limit: Decimal,
    /// `total_score − limit`.
    pub overage: Decimal,
}

impl GroupScoreOverage {
    /// Converts the overage into an audit warning.
    pub fn to_warning(&self) -> AuditWarning {
        AuditWarning::new(
            WARNING_GROUP_SCORE_OVERAGE,
            format!(
                "Group '{}' scores {} against a limit of {} ({} members): over by {}",
                self.group_key,
                self.total_score.normalize(),
                self.limit,
                self.member_count,
                self.overage.normalize()
            ),
            "medium",
        )
    }
}

/// The outcome of a change to one employee's evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationUpdate {
    /// The employee's result after the change.
    pub result: EvaluationResult,
    /// The employee's group, if its score sum now exceeds the budget.
    pub overage: Option<GroupScoreOverage>,
    /// Warnings raised by the change.
    pub warnings: Vec<AuditWarning>,
    /// The payout step that produced the new figures.
    pub audit_step: AuditStep,
}

/// Checks the score budget of one group.
///
/// Returns `None` when `Σ score ≤ members × 100`.
///
/// # Example
///
/// ```
/// use evaluation_engine::calculation::check_group_score;
/// use evaluation_engine::models::EvaluationResult;
/// use rust_decimal::Decimal;
///
/// let mut a = EvaluationResult::new("emp_001", "dev", Decimal::ZERO, Decimal::ONE);
/// let mut b = EvaluationResult::new("emp_002", "dev", Decimal::ZERO, Decimal::ONE);
/// a.score = Decimal::from(130);
/// b.score = Decimal::from(90);
///
/// let overage = check_group_score("dev", [&a, &b]).unwrap();
/// assert_eq!(overage.overage, Decimal::from(20));
/// ```
pub fn check_group_score<'a, I>(group_key: &str, members: I) -> Option<GroupScoreOverage>
where
    I: IntoIterator<Item = &'a EvaluationResult>,
{
    let (member_count, total_score) = members
        .into_iter()
        .fold((0usize, Decimal::ZERO), |(count, total), member| {
            (count + 1, total + member.score)
        });
    let limit = SCORE_BUDGET_PER_MEMBER * Decimal::from(member_count);

    (total_score > limit).then(|| GroupScoreOverage {
        group_key: group_key.to_string(),
        member_count,
        total_score,
        limit,
        overage: total_score - limit,
    })
}

/// Recomputes the grade-derived fields of a result.
///
/// The result is left untouched if the grade is not in the scale. A work rate
/// below the gradeable minimum forces the grade to `None`.
pub fn recompute_evaluation(
    result: &mut EvaluationResult,
    grade: Option<&Grade>,
    scale: &GradingScale,
    step_number: u32,
) -> EngineResult<PayoutResult> {
    let payout = calculate_payout(grade, result.base_amount, result.work_rate, scale, step_number)?;

    result.grade = payout.grade.clone();
    result.score = payout.score;
    result.payout_rate_percent = payout.payout_rate_percent;
    result.grade_amount = payout.grade_amount;
    result.final_amount = payout.final_amount;

    Ok(payout)
}

/// The evaluation results of one period, keyed by employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationBook {
    period: Period,
    results: BTreeMap<String, EvaluationResult>,
}

impl EvaluationBook {
    /// Creates an empty book for a period.
    pub fn new(period: Period) -> Self {
        Self {
            period,
            results: BTreeMap::new(),
        }
    }

    /// The period this book evaluates.
    pub fn period(&self) -> Period {
        self.period
    }

    /// Adds an ungraded employee to the book.
    pub fn enroll(
        &mut self,
        employee_id: &str,
        group_key: &str,
        base_amount: Decimal,
        work_rate: Decimal,
    ) -> EngineResult<&EvaluationResult> {
        if employee_id.trim().is_empty() {
            return Err(EngineError::validation("employee_id", "must not be empty"));
        }
        if self.results.contains_key(employee_id) {
            return Err(EngineError::validation(
                "employee_id",
                format!("'{}' is already enrolled in {}", employee_id, self.period),
            ));
        }
        if base_amount < Decimal::ZERO {
            return Err(EngineError::validation("base_amount", "must not be negative"));
        }
        validate_work_rate(work_rate)?;

        let result = EvaluationResult::new(employee_id, group_key, base_amount, work_rate);
        Ok(self.results.entry(employee_id.to_string()).or_insert(result))
    }

    /// Looks up an employee's result.
    pub fn get(&self, employee_id: &str) -> Option<&EvaluationResult> {
        self.results.get(employee_id)
    }

    /// Iterates over all results in employee order.
    pub fn results(&self) -> impl Iterator<Item = &EvaluationResult> {
        self.results.values()
    }

    /// Number of enrolled employees.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nobody is enrolled.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Assigns a grade, or clears it with `None`.
    ///
    /// The grade is committed even when the employee's group goes over its
    /// score budget; the overage is returned alongside the result.
    /// `step_number` places the payout step in the caller's audit trace.
    pub fn assign_grade(
        &mut self,
        employee_id: &str,
        grade: Option<&str>,
        scale: &GradingScale,
        step_number: u32,
    ) -> EngineResult<EvaluationUpdate> {
        let grade = grade.map(|label| scale.validate_grade(label)).transpose()?;
        let result = self.current(employee_id)?.clone();
        let update = self.recompute(result, grade.as_ref(), scale, step_number)?;
        info!(
            employee_id = %employee_id,
            grade = ?update.result.grade.as_ref().map(Grade::as_str),
            final_amount = %update.result.final_amount,
            "Grade assigned"
        );
        Ok(update)
    }

    /// Replaces an employee's work rate and recomputes the payout.
    ///
    /// The stored grade is kept unless the new rate makes the employee not
    /// gradeable, in which case it is dropped for good. A grade that has
    /// since been removed from the scale is reset to `None` with a
    /// `GRADE_REMOVED` warning. On error the stored result is unchanged.
    pub fn apply_work_rate(
        &mut self,
        employee_id: &str,
        work_rate: Decimal,
        scale: &GradingScale,
        step_number: u32,
    ) -> EngineResult<EvaluationUpdate> {
        validate_work_rate(work_rate)?;
        let mut result = self.current(employee_id)?.clone();
        result.work_rate = work_rate;

        let removed = result.grade.clone().filter(|grade| !scale.contains(grade));
        let grade = result.grade.clone().filter(|grade| scale.contains(grade));
        let mut update = self.recompute(result, grade.as_ref(), scale, step_number)?;

        if let Some(removed) = removed {
            warn!(
                employee_id = %employee_id,
                grade = %removed.as_str(),
                "Grade no longer in the grading scale, reset to none"
            );
            update.warnings.push(AuditWarning::new(
                WARNING_GRADE_REMOVED,
                format!(
                    "Grade '{}' of {} is no longer in the grading scale and was reset",
                    removed.as_str(),
                    employee_id
                ),
                "high",
            ));
        }
        Ok(update)
    }

    /// Clears an employee's grade.
    pub fn reset_grade(
        &mut self,
        employee_id: &str,
        scale: &GradingScale,
        step_number: u32,
    ) -> EngineResult<EvaluationUpdate> {
        let result = self.current(employee_id)?.clone();
        self.recompute(result, None, scale, step_number)
    }

    /// All members of a group, in employee order.
    pub fn group_members(&self, group_key: &str) -> Vec<&EvaluationResult> {
        self.results
            .values()
            .filter(|result| result.group_key == group_key)
            .collect()
    }

    /// Every group currently over its score budget.
    pub fn group_score_overages(&self) -> Vec<GroupScoreOverage> {
        let mut groups: BTreeMap<&str, Vec<&EvaluationResult>> = BTreeMap::new();
        for result in self.results.values() {
            groups.entry(result.group_key.as_str()).or_default().push(result);
        }
        groups
            .into_iter()
            .filter_map(|(key, members)| check_group_score(key, members))
            .collect()
    }

    fn current(&self, employee_id: &str) -> EngineResult<&EvaluationResult> {
        self.results
            .get(employee_id)
            .ok_or_else(|| EngineError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            })
    }

    /// Recomputes `result` and stores it only if the payout succeeds.
    fn recompute(
        &mut self,
        mut result: EvaluationResult,
        grade: Option<&Grade>,
        scale: &GradingScale,
        step_number: u32,
    ) -> EngineResult<EvaluationUpdate> {
        let payout = recompute_evaluation(&mut result, grade, scale, step_number)?;
        self.results
            .insert(result.employee_id.clone(), result.clone());

        let overage = check_group_score(&result.group_key, self.group_members(&result.group_key));
        let mut warnings: Vec<AuditWarning> = payout.warning.into_iter().collect();
        if let Some(overage) = &overage {
            warn!(
                group_key = %overage.group_key,
                overage = %overage.overage,
                "Group score budget exceeded"
            );
            warnings.push(overage.to_warning());
        }

        Ok(EvaluationUpdate {
            result,
            overage,
            warnings,
            audit_step: payout.audit_step,
        })
    }
}

fn validate_work_rate(work_rate: Decimal) -> EngineResult<()> {
    if work_rate < Decimal::ZERO || work_rate > Decimal::ONE {
        return Err(EngineError::validation(
            "work_rate",
            format!("{} is outside [0, 1]", work_rate),
        ));
    }
    Ok(())
}
