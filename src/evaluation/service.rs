//! Evaluation service.
//!
//! Every change loads a period's book, applies it, and saves the book back
//! under one lock, so concurrent grading and repricing never lose an update.

use std::sync::Arc;

use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::info;

use crate::calculation::{EvaluationBook, EvaluationUpdate, WorkRateResult};
use crate::error::EngineResult;
use crate::models::{EvaluationResult, Grade, Period};
use crate::store::{EvaluationStore, GradingScaleStore};

/// Grades and reprices evaluations held in the injected stores.
pub struct EvaluationService {
    books: Arc<dyn EvaluationStore>,
    grading: Arc<dyn GradingScaleStore>,
    write_lock: Mutex<()>,
}

impl EvaluationService {
    /// Creates a service over the given stores.
    pub fn new(books: Arc<dyn EvaluationStore>, grading: Arc<dyn GradingScaleStore>) -> Self {
        Self {
            books,
            grading,
            write_lock: Mutex::new(()),
        }
    }

    /// The book of a period. Empty if nobody has been enrolled yet.
    pub fn book(&self, period: Period) -> EngineResult<EvaluationBook> {
        Ok(self
            .books
            .get(period)?
            .unwrap_or_else(|| EvaluationBook::new(period)))
    }

    /// Adds an ungraded employee to a period.
    pub fn enroll(
        &self,
        period: Period,
        employee_id: &str,
        group_key: &str,
        base_amount: Decimal,
        work_rate: Decimal,
    ) -> EngineResult<EvaluationResult> {
        let _guard = self.write_lock.lock();
        let mut book = self.book(period)?;
        let result = book
            .enroll(employee_id, group_key, base_amount, work_rate)?
            .clone();
        self.books.save(book)?;

        info!(
            employee_id = %employee_id,
            period = %period,
            group_key = %group_key,
            work_rate = %work_rate,
            "Employee enrolled"
        );
        Ok(result)
    }

    /// Assigns a grade in a period, or clears it with `None`.
    pub fn assign_grade(
        &self,
        period: Period,
        employee_id: &str,
        grade: Option<&str>,
    ) -> EngineResult<EvaluationUpdate> {
        let _guard = self.write_lock.lock();
        let scale = self.grading.get()?;
        let mut book = self.book(period)?;
        let update = book.assign_grade(employee_id, grade, &scale, 1)?;
        self.books.save(book)?;
        Ok(update)
    }

    /// Reprices an employee with freshly computed work rates.
    ///
    /// Each result is applied to the book of its own period. Periods with no
    /// book, or whose book does not list the employee, are skipped. The
    /// payout step is numbered after the steps of the work-rate trace.
    pub fn apply_work_rates(
        &self,
        employee_id: &str,
        work_rates: &[WorkRateResult],
    ) -> EngineResult<Vec<EvaluationUpdate>> {
        let _guard = self.write_lock.lock();
        let scale = self.grading.get()?;
        let mut updates = Vec::new();

        for work_rate in work_rates {
            let period = work_rate.summary.period;
            let Some(mut book) = self.books.get(period)? else {
                continue;
            };
            if book.get(employee_id).is_none() {
                continue;
            }

            let update = book.apply_work_rate(
                employee_id,
                work_rate.summary.monthly_work_rate,
                &scale,
                work_rate.audit_trace.next_step_number(),
            )?;
            self.books.save(book)?;

            info!(
                employee_id = %employee_id,
                period = %period,
                work_rate = %update.result.work_rate,
                grade = ?update.result.grade.as_ref().map(Grade::as_str),
                final_amount = %update.result.final_amount,
                "Evaluation repriced"
            );
            updates.push(update);
        }

        Ok(updates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        AuditStep, AuditTrace, DeductionBreakdown, GradeDefinition, GradingScale,
        WARNING_GRADE_REMOVED, WARNING_NOT_GRADEABLE, WorkRateSummary,
    };
    use crate::store::{InMemoryEvaluationStore, InMemoryGradingScaleStore};
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn january() -> Period {
        Period::new(2024, 1).unwrap()
    }

    fn create_test_scale(labels: &[(&str, &str, &str)]) -> GradingScale {
        let mut grades = BTreeMap::new();
        for (label, score, payout) in labels {
            grades.insert(
                Grade::from(*label),
                GradeDefinition {
                    score: dec(score),
                    payout_rate_percent: dec(payout),
                    description: String::new(),
                },
            );
        }
        GradingScale::new(grades).unwrap()
    }

    fn create_service() -> (EvaluationService, Arc<InMemoryGradingScaleStore>) {
        let grading = Arc::new(InMemoryGradingScaleStore::new(create_test_scale(&[
            ("A", "110", "120"),
            ("B", "100", "100"),
        ])));
        let service = EvaluationService::new(Arc::new(InMemoryEvaluationStore::new()), grading.clone());
        (service, grading)
    }

    fn work_rate(period: Period, rate: &str, steps: u32) -> WorkRateResult {
        let mut audit_trace = AuditTrace::default();
        for step_number in 1..=steps {
            audit_trace.steps.push(AuditStep {
                step_number,
                rule_id: "work_rate".to_string(),
                rule_name: "Work rate".to_string(),
                input: serde_json::Value::Null,
                output: serde_json::Value::Null,
                reasoning: String::new(),
            });
        }
        WorkRateResult {
            summary: WorkRateSummary {
                employee_id: "emp_001".to_string(),
                period,
                business_days: 22,
                standard_hours: dec("176"),
                deduction_hours: DeductionBreakdown::default(),
                total_deduction_hours: Decimal::ZERO,
                total_work_hours: dec("176"),
                monthly_work_rate: dec(rate),
            },
            audit_trace,
        }
    }

    #[test]
    fn test_book_is_empty_until_enrolled() {
        let (service, _) = create_service();
        assert!(service.book(january()).unwrap().is_empty());

        service
            .enroll(january(), "emp_001", "dev", dec("1000000"), Decimal::ONE)
            .unwrap();
        assert_eq!(service.book(january()).unwrap().len(), 1);
        assert!(service.enroll(january(), "emp_001", "dev", dec("1000000"), Decimal::ONE).is_err());
    }

    #[test]
    fn test_assign_grade_is_persisted() {
        let (service, _) = create_service();
        service
            .enroll(january(), "emp_001", "dev", dec("1000000"), dec("0.5"))
            .unwrap();

        let update = service.assign_grade(january(), "emp_001", Some("A")).unwrap();
        assert_eq!(update.result.final_amount, dec("600000"));
        assert_eq!(update.audit_step.step_number, 1);

        let book = service.book(january()).unwrap();
        assert_eq!(book.get("emp_001").unwrap(), &update.result);
    }

    #[test]
    fn test_apply_work_rates_reprices_enrolled_periods_only() {
        let (service, _) = create_service();
        service
            .enroll(january(), "emp_001", "dev", dec("1000000"), Decimal::ONE)
            .unwrap();
        service.assign_grade(january(), "emp_001", Some("B")).unwrap();

        let february = Period::new(2024, 2).unwrap();
        let updates = service
            .apply_work_rates(
                "emp_001",
                &[work_rate(january(), "0.75", 4), work_rate(february, "0.5", 4)],
            )
            .unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].result.work_rate, dec("0.75"));
        assert_eq!(updates[0].result.final_amount, dec("750000"));
        assert_eq!(updates[0].audit_step.step_number, 5);
        assert_eq!(service.book(january()).unwrap().get("emp_001").unwrap().final_amount, dec("750000"));
        assert!(service.book(february).unwrap().is_empty());
    }

    #[test]
    fn test_apply_work_rates_below_minimum_clears_grade() {
        let (service, _) = create_service();
        service
            .enroll(january(), "emp_001", "dev", dec("1000000"), Decimal::ONE)
            .unwrap();
        service.assign_grade(january(), "emp_001", Some("A")).unwrap();

        let updates = service
            .apply_work_rates("emp_001", &[work_rate(january(), "0.2", 2)])
            .unwrap();

        assert!(updates[0].result.grade.is_none());
        assert_eq!(updates[0].result.final_amount, Decimal::ZERO);
        assert!(updates[0].warnings.iter().any(|w| w.code == WARNING_NOT_GRADEABLE));
        assert!(service.book(january()).unwrap().get("emp_001").unwrap().grade.is_none());
    }

    #[test]
    fn test_apply_work_rates_resets_grade_missing_from_scale() {
        let (service, grading) = create_service();
        service
            .enroll(january(), "emp_001", "dev", dec("1000000"), Decimal::ONE)
            .unwrap();
        service.assign_grade(january(), "emp_001", Some("A")).unwrap();
        grading.replace(create_test_scale(&[("B", "100", "100")]));

        let updates = service
            .apply_work_rates("emp_001", &[work_rate(january(), "0.9", 1)])
            .unwrap();

        assert!(updates[0].result.grade.is_none());
        assert!(updates[0].warnings.iter().any(|w| w.code == WARNING_GRADE_REMOVED));
        assert_eq!(updates[0].result.work_rate, dec("0.9"));
    }
}
