//! Grades and the grading scale.
//!
//! Grades are an open set: the admin can add or remove grades at runtime,
//! so a [`Grade`] is a validated string rather than a fixed enum.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A performance tier such as `"B+"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grade(String);

impl Grade {
    /// Creates a grade label. Membership in a scale is checked separately
    /// by [`GradingScale::validate_grade`].
    pub fn new(label: impl Into<String>) -> Self {
        Grade(label.into())
    }

    /// The grade label.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Grade {
    fn from(label: &str) -> Self {
        Grade::new(label)
    }
}

/// Score and payout rate of one grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeDefinition {
    /// Numeric score used for group score totals.
    pub score: Decimal,
    /// Percentage of the base amount paid for this grade.
    pub payout_rate_percent: Decimal,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
}

/// Mapping from grade to its score and payout rate.
///
/// # Example
///
/// ```
/// use evaluation_engine::models::{Grade, GradeDefinition, GradingScale};
/// use rust_decimal::Decimal;
///
/// let mut scale = GradingScale::default();
/// scale
///     .insert(
///         Grade::from("B"),
///         GradeDefinition {
///             score: Decimal::from(100),
///             payout_rate_percent: Decimal::from(100),
///             description: "meets expectations".to_string(),
///         },
///     )
///     .unwrap();
///
/// assert!(scale.validate_grade("B").is_ok());
/// assert!(scale.validate_grade("Z").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradingScale {
    grades: BTreeMap<Grade, GradeDefinition>,
}

impl GradingScale {
    /// Builds a scale, rejecting negative scores or payout rates.
    pub fn new(grades: BTreeMap<Grade, GradeDefinition>) -> EngineResult<Self> {
        for (grade, definition) in &grades {
            check_definition(grade, definition)?;
        }
        Ok(Self { grades })
    }

    /// Adds or replaces a grade.
    pub fn insert(&mut self, grade: Grade, definition: GradeDefinition) -> EngineResult<()> {
        check_definition(&grade, &definition)?;
        self.grades.insert(grade, definition);
        Ok(())
    }

    /// Removes a grade, returning its definition if it existed.
    pub fn remove(&mut self, grade: &Grade) -> Option<GradeDefinition> {
        self.grades.remove(grade)
    }

    /// Returns the definition of a grade.
    pub fn get(&self, grade: &Grade) -> Option<&GradeDefinition> {
        self.grades.get(grade)
    }

    /// Returns true if the grade is part of this scale.
    pub fn contains(&self, grade: &Grade) -> bool {
        self.grades.contains_key(grade)
    }

    /// Parses a label into a [`Grade`] that is known to this scale.
    pub fn validate_grade(&self, label: &str) -> EngineResult<Grade> {
        let grade = Grade::new(label.trim());
        if self.contains(&grade) {
            Ok(grade)
        } else {
            Err(EngineError::UnknownGrade {
                grade: label.to_string(),
            })
        }
    }

    /// Returns the definition of a grade or [`EngineError::UnknownGrade`].
    pub fn definition(&self, grade: &Grade) -> EngineResult<&GradeDefinition> {
        self.grades.get(grade).ok_or_else(|| EngineError::UnknownGrade {
            grade: grade.to_string(),
        })
    }

    /// Grades in report order: descending payout rate, then descending score,
    /// then label.
    pub fn ordered(&self) -> Vec<(&Grade, &GradeDefinition)> {
        let mut entries: Vec<_> = self.grades.iter().collect();
        entries.sort_by(|(ga, a), (gb, b)| {
            b.payout_rate_percent
                .cmp(&a.payout_rate_percent)
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| ga.cmp(gb))
        });
        entries
    }

    /// The number of grades.
    pub fn len(&self) -> usize {
        self.grades.len()
    }

    /// Returns true if the scale has no grades.
    pub fn is_empty(&self) -> bool {
        self.grades.is_empty()
    }
}

fn check_definition(grade: &Grade, definition: &GradeDefinition) -> EngineResult<()> {
    if grade.as_str().trim().is_empty() {
        return Err(EngineError::validation("grade", "must not be empty"));
    }
    if definition.score < Decimal::ZERO {
        return Err(EngineError::validation(
            "score",
            format!("grade '{}' has a negative score", grade),
        ));
    }
    if definition.payout_rate_percent < Decimal::ZERO {
        return Err(EngineError::validation(
            "payout_rate_percent",
            format!("grade '{}' has a negative payout rate", grade),
        ));
    }
    Ok(())
}
