//! Configuration types for the evaluation engine.
//!
//! This module contains the file shapes deserialized from YAML and the
//! validated [`EngineConfig`] they are assembled into.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::{
    AttendanceType, AttendanceTypeTable, Grade, GradeDefinition, GradingScale, Holiday,
    HolidayCalendar,
};

/// `grading_scale.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct GradingScaleFile {
    /// Grade label to score and payout rate.
    pub grades: BTreeMap<Grade, GradeDefinition>,
}

/// `attendance_types.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceTypesFile {
    /// The configured attendance exception types.
    pub attendance_types: Vec<AttendanceType>,
}

/// One file under `holidays/`, covering a single year.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFile {
    /// The year every listed holiday falls in.
    pub year: i32,
    /// The holidays of that year.
    pub holidays: Vec<Holiday>,
}

/// The complete, validated engine configuration.
///
/// Built by [`ConfigLoader`](super::ConfigLoader) from a configuration
/// directory, or directly with [`EngineConfig::new`] in tests.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    grading_scale: GradingScale,
    attendance_types: AttendanceTypeTable,
    holidays: Vec<Holiday>,
    holiday_calendar: HolidayCalendar,
}

impl EngineConfig {
    /// Assembles a configuration from already validated parts.
    pub fn new(
        grading_scale: GradingScale,
        attendance_types: AttendanceTypeTable,
        mut holidays: Vec<Holiday>,
    ) -> Self {
        holidays.sort_by_key(|h| h.date);
        let holiday_calendar = HolidayCalendar::from_holidays(&holidays);
        Self {
            grading_scale,
            attendance_types,
            holidays,
            holiday_calendar,
        }
    }

    /// The grading scale the engine starts with.
    pub fn grading_scale(&self) -> &GradingScale {
        &self.grading_scale
    }

    /// The attendance type table.
    pub fn attendance_types(&self) -> &AttendanceTypeTable {
        &self.attendance_types
    }

    /// Every configured holiday, ordered by date.
    pub fn holidays(&self) -> &[Holiday] {
        &self.holidays
    }

    /// The holiday dates as a calendar.
    pub fn holiday_calendar(&self) -> &HolidayCalendar {
        &self.holiday_calendar
    }
}
