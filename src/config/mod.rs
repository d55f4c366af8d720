//! Configuration loading for the evaluation engine.
//!
//! This module loads the grading scale, the attendance-type table and the
//! public holiday calendar from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use evaluation_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("{} holidays loaded", config.holiday_calendar().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AttendanceTypesFile, EngineConfig, GradingScaleFile, HolidayFile};
