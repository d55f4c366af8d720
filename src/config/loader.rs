//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use chrono::Datelike;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceTypeTable, GradingScale, Holiday, HolidayCalendar};

use super::types::{AttendanceTypesFile, EngineConfig, GradingScaleFile, HolidayFile};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── grading_scale.yaml     # Grade -> score, payout rate, description
/// ├── attendance_types.yaml  # Attendance exception types and deductions
/// └── holidays/
///     └── 2024.yaml          # Public holidays of one year
/// ```
///
/// # Example
///
/// ```no_run
/// use evaluation_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("{} grades configured", loader.grading_scale().len());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML or fails validation (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let grading_path = path.join("grading_scale.yaml");
        let grading_file = Self::load_yaml::<GradingScaleFile>(&grading_path)?;
        let grading_scale = GradingScale::new(grading_file.grades)
            .map_err(|e| Self::invalid(&grading_path, e))?;

        let types_path = path.join("attendance_types.yaml");
        let types_file = Self::load_yaml::<AttendanceTypesFile>(&types_path)?;
        let attendance_types = AttendanceTypeTable::new(types_file.attendance_types)
            .map_err(|e| Self::invalid(&types_path, e))?;

        let holidays = Self::load_holidays(&path.join("holidays"))?;

        info!(
            path = %path.display(),
            grades = grading_scale.len(),
            attendance_types = attendance_types.len(),
            holidays = holidays.len(),
            "Configuration loaded"
        );

        Ok(Self {
            config: EngineConfig::new(grading_scale, attendance_types, holidays),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads every holiday file from the holidays directory.
    fn load_holidays(holidays_dir: &Path) -> EngineResult<Vec<Holiday>> {
        let holidays_dir_str = holidays_dir.display().to_string();

        let entries = fs::read_dir(holidays_dir).map_err(|_| EngineError::ConfigNotFound {
            path: holidays_dir_str.clone(),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: holidays_dir_str.clone(),
            })?;
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no holiday files found)", holidays_dir_str),
            });
        }

        let mut holidays = Vec::new();
        for path in files {
            let file = Self::load_yaml::<HolidayFile>(&path)?;
            if let Some(stray) = file.holidays.iter().find(|h| h.date.year() != file.year) {
                return Err(EngineError::ConfigParseError {
                    path: path.display().to_string(),
                    message: format!("holiday {} is not in year {}", stray.date, file.year),
                });
            }
            holidays.extend(file.holidays);
        }

        Ok(holidays)
    }

    fn invalid(path: &Path, error: EngineError) -> EngineError {
        EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: error.to_string(),
        }
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    /// The configured grading scale.
    pub fn grading_scale(&self) -> &GradingScale {
        self.config.grading_scale()
    }

    /// The configured attendance types.
    pub fn attendance_types(&self) -> &AttendanceTypeTable {
        self.config.attendance_types()
    }

    /// The configured holidays as a calendar.
    pub fn holiday_calendar(&self) -> &HolidayCalendar {
        self.config.holiday_calendar()
    }
}
