//! HTTP request handlers for the evaluation engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{WorkRateResult, calculate_work_rate, recompute_evaluation};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ApprovalRequest, EvaluationResult, HolidayCalendar, NewApprovalRequest, Period,
};

use super::request::{
    ActionRequest, ApprovalListQuery, EnrollRequest, GradeRequest, PayoutRequest, PeriodQuery,
    PermissionsQuery, WorkRateRequest,
};
use super::response::{
    ActionResponse, ApiError, ApiErrorResponse, EvaluationBookResponse, GradeEntry,
    PayoutResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/work-rate", post(work_rate_handler))
        .route("/employees/:employee_id/work-rate", get(stored_work_rate_handler))
        .route("/payout", post(payout_handler))
        .route("/grading-scale", get(grading_scale_handler))
        .route("/evaluations/:year/:month", get(evaluation_book_handler))
        .route("/evaluations/:year/:month/employees", post(enroll_handler))
        .route(
            "/evaluations/:year/:month/employees/:employee_id/grade",
            put(grade_handler),
        )
        .route("/approvals", post(submit_handler).get(list_approvals_handler))
        .route("/approvals/:id", get(get_approval_handler))
        .route("/approvals/:id/permissions", get(permissions_handler))
        .route("/approvals/:id/actions", post(action_handler))
        .with_state(state)
}

/// Handler for POST /work-rate.
///
/// Computes a work rate from records supplied in the body.
async fn work_rate_handler(
    State(state): State<AppState>,
    payload: Result<Json<WorkRateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing work-rate request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match compute_work_rate(&state, request) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.summary.employee_id,
                monthly_work_rate = %result.summary.monthly_work_rate,
                warnings = result.audit_trace.warnings.len(),
                duration_us = start_time.elapsed().as_micros(),
                "Work rate calculated"
            );
            json_response(StatusCode::OK, &result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /employees/:employee_id/work-rate?year=&month=.
///
/// Computes a work rate from the committed records in the record store.
async fn stored_work_rate_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    query: Result<Query<PeriodQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    let result = Period::new(query.year, query.month)
        .and_then(|period| stored_work_rate(&state, &employee_id, period));
    match result {
        Ok(result) => json_response(StatusCode::OK, &result),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /payout.
async fn payout_handler(
    State(state): State<AppState>,
    payload: Result<Json<PayoutRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payout request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match compute_payout(&state, request) {
        Ok(response) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %response.evaluation.employee_id,
                final_amount = %response.evaluation.final_amount,
                "Payout calculated"
            );
            json_response(StatusCode::OK, &response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /grading-scale.
///
/// Lists grades by descending payout rate.
async fn grading_scale_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.grading().get() {
        Ok(scale) => {
            let entries: Vec<GradeEntry> = scale
                .ordered()
                .into_iter()
                .map(|(grade, definition)| GradeEntry {
                    grade: grade.clone(),
                    score: definition.score,
                    payout_rate_percent: definition.payout_rate_percent,
                    description: definition.description.clone(),
                })
                .collect();
            json_response(StatusCode::OK, &entries)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /approvals.
async fn submit_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewApprovalRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing approval submission");

    let submission = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.approvals().submit(submission, Utc::now()) {
        Ok(request) => json_response(StatusCode::CREATED, &request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /approvals.
async fn list_approvals_handler(
    State(state): State<AppState>,
    query: Result<Query<ApprovalListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match list_approvals(&state, &query) {
        Ok(requests) => json_response(StatusCode::OK, &requests),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /evaluations/:year/:month.
async fn evaluation_book_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    let result = Period::new(year, month).and_then(|period| state.evaluations().book(period));
    match result {
        Ok(book) => json_response(StatusCode::OK, &EvaluationBookResponse::from(&book)),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /evaluations/:year/:month/employees.
///
/// Enrolls an ungraded employee. Without an explicit work rate the rate is
/// derived from the employee's stored records for that month.
async fn enroll_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32)>, PathRejection>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path((year, month)) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match enroll(&state, year, month, request) {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                employee_id = %result.employee_id,
                work_rate = %result.work_rate,
                "Employee enrolled"
            );
            json_response(StatusCode::CREATED, &result)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /evaluations/:year/:month/employees/:employee_id/grade.
async fn grade_handler(
    State(state): State<AppState>,
    path: Result<Path<(i32, u32, String)>, PathRejection>,
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path((year, month, employee_id)) = match path {
        Ok(path) => path,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let result = Period::new(year, month).and_then(|period| {
        state
            .evaluations()
            .assign_grade(period, &employee_id, request.grade.as_deref())
    });
    match result {
        Ok(update) => json_response(StatusCode::OK, &update),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /approvals/:id.
async fn get_approval_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.approvals().get(id) {
        Ok(request) => json_response(StatusCode::OK, &request),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /approvals/:id/permissions?user_id=&role=.
async fn permissions_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<PermissionsQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };

    match state.approvals().permissions(id, &query.into()) {
        Ok(allowed) => json_response(StatusCode::OK, &allowed),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /approvals/:id/actions.
///
/// Applies a workflow action. A final approval also returns the recomputed
/// work rates of every month the committed change touched, and the stored
/// evaluations repriced with them.
async fn action_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActionRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    info!(
        correlation_id = %correlation_id,
        request_id = %id,
        actor = %request.actor.user_id,
        action = request.action.name(),
        "Processing approval action"
    );

    match perform_action(&state, id, request) {
        Ok(response) => json_response(StatusCode::OK, &response),
        Err(err) => error_response(correlation_id, err),
    }
}

fn compute_work_rate(state: &AppState, request: WorkRateRequest) -> EngineResult<WorkRateResult> {
    let period = Period::new(request.year, request.month)?;
    for record in &request.daily_records {
        record.validate()?;
    }
    for record in &request.shortened_records {
        record.validate()?;
    }

    let supplied_holidays = request.holidays.as_deref().map(|h| HolidayCalendar::from_holidays(h));
    let holidays = supplied_holidays
        .as_ref()
        .unwrap_or_else(|| state.config().holiday_calendar());

    Ok(calculate_work_rate(
        &request.employee_id,
        period,
        &request.daily_records,
        &request.shortened_records,
        state.config().attendance_types(),
        holidays,
    ))
}

fn stored_work_rate(
    state: &AppState,
    employee_id: &str,
    period: Period,
) -> EngineResult<WorkRateResult> {
    let records = state.records().query_by_period(employee_id, period)?;
    Ok(calculate_work_rate(
        employee_id,
        period,
        &records.daily,
        &records.shortened,
        state.config().attendance_types(),
        state.config().holiday_calendar(),
    ))
}

fn enroll(
    state: &AppState,
    year: i32,
    month: u32,
    request: EnrollRequest,
) -> EngineResult<EvaluationResult> {
    let period = Period::new(year, month)?;
    let work_rate = match request.work_rate {
        Some(work_rate) => work_rate,
        None => stored_work_rate(state, &request.employee_id, period)?
            .summary
            .monthly_work_rate,
    };
    state.evaluations().enroll(
        period,
        &request.employee_id,
        &request.group_key,
        request.base_amount,
        work_rate,
    )
}

fn compute_payout(state: &AppState, request: PayoutRequest) -> EngineResult<PayoutResponse> {
    if request.base_amount < Decimal::ZERO {
        return Err(EngineError::validation("base_amount", "must not be negative"));
    }
    if request.work_rate < Decimal::ZERO || request.work_rate > Decimal::ONE {
        return Err(EngineError::validation("work_rate", "must be within [0, 1]"));
    }

    let scale = state.grading().get()?;
    let grade = request
        .grade
        .as_deref()
        .map(|label| scale.validate_grade(label))
        .transpose()?;

    let mut evaluation = EvaluationResult::new(
        request.employee_id,
        request.group_key,
        request.base_amount,
        request.work_rate,
    );
    let payout = recompute_evaluation(&mut evaluation, grade.as_ref(), &scale, 1)?;

    Ok(PayoutResponse {
        evaluation,
        gradeable: payout.gradeable,
        audit_step: payout.audit_step,
        warnings: payout.warning.into_iter().collect(),
    })
}

fn list_approvals(state: &AppState, query: &ApprovalListQuery) -> EngineResult<Vec<ApprovalRequest>> {
    let approvals = state.approvals();
    let mut requests = if query.hr_queue {
        approvals.hr_queue()?
    } else if let Some(approver_id) = &query.team_approver_id {
        approvals.team_queue(approver_id)?
    } else if let Some(requester_id) = &query.requester_id {
        approvals.requested_by(requester_id)?
    } else {
        approvals.list()?
    };

    if let Some(approver_id) = &query.team_approver_id {
        requests.retain(|r| &r.approver_team_id == approver_id);
    }
    if let Some(requester_id) = &query.requester_id {
        requests.retain(|r| &r.requester_id == requester_id);
    }
    Ok(requests)
}

fn perform_action(state: &AppState, id: Uuid, request: ActionRequest) -> EngineResult<ActionResponse> {
    let report = state.approvals().act(
        id,
        &request.actor,
        &request.action,
        request.expected_version,
        Utc::now(),
    )?;

    let (recomputed_work_rates, repriced_evaluations) = match &report.committed {
        Some(change) => {
            let work_rates = change
                .affected_periods
                .iter()
                .map(|period| stored_work_rate(state, &change.employee_id, *period))
                .collect::<EngineResult<Vec<_>>>()?;
            let repriced = state
                .evaluations()
                .apply_work_rates(&change.employee_id, &work_rates)?;
            let summaries = work_rates.into_iter().map(|result| result.summary).collect();
            (summaries, repriced)
        }
        None => (Vec::new(), Vec::new()),
    };

    Ok(ActionResponse {
        request: report.request,
        effect: report.effect,
        committed: report.committed,
        recomputed_work_rates,
        repriced_evaluations,
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "Request failed");
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::new("VALIDATION_ERROR", body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
    let response = ApiErrorResponse::bad_request(ApiError::invalid_parameter(rejection.body_text()));
    json_response(response.status, &response.error)
}

fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    warn!(correlation_id = %correlation_id, error = %rejection, "Invalid path parameter");
    let response = ApiErrorResponse::bad_request(ApiError::invalid_parameter(rejection.body_text()));
    json_response(response.status, &response.error)
}
