//! HTTP API for the evaluation engine.
//!
//! This module exposes work-rate and payout calculation, the stored
//! evaluation periods and the approval workflow as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    ActionRequest, ApprovalListQuery, EnrollRequest, GradeRequest, PayoutRequest, PeriodQuery,
    PermissionsQuery, WorkRateRequest,
};
pub use response::{
    ActionResponse, ApiError, ApiErrorResponse, EvaluationBookResponse, GradeEntry,
    PayoutResponse,
};
pub use state::AppState;
