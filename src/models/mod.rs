//! Core data models for the evaluation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod approval;
mod attendance;
mod audit;
mod evaluation;
mod grading;
mod period;

pub use approval::{
    Actor, ApprovalRequest, ApprovalStage, ChangeAction, ChangePayload, HrStatus,
    NewApprovalRequest, Role, TeamStatus,
};
pub use attendance::{
    AttendanceRecord, AttendanceType, AttendanceTypeTable, DailyAttendanceRecord, PeriodRecords,
    RecordKind, ShortenedWorkHourRecord, ShortenedWorkType,
};
pub use audit::{
    AuditStep, AuditTrace, AuditWarning, WARNING_GRADE_REMOVED, WARNING_GROUP_SCORE_OVERAGE,
    WARNING_NOT_GRADEABLE, WARNING_UNKNOWN_ATTENDANCE_TYPE,
};
pub use evaluation::{DeductionBreakdown, EvaluationResult, WorkRateSummary};
pub use grading::{Grade, GradeDefinition, GradingScale};
pub use period::{Holiday, HolidayCalendar, Period};
