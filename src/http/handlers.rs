//! Request handlers and wire DTOs for the proctoring API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::lifecycle;
use crate::models::session::{ExamSession, SessionStatus};
use crate::models::verification::IdentityVerificationLog;
use crate::models::violation::{Severity, Violation};
use crate::AppError;

use super::AppState;

/// `AppError` wrapper carrying the HTTP status mapping.
pub struct ApiError(AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PreconditionFailed(_) | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::InvalidTransition(_) => StatusCode::CONFLICT,
            AppError::Config(_) | AppError::Db(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Shared handler result.
type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Body of `POST /sessions/start`.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Candidate requesting to start.
    pub candidate_id: String,
    /// Exam to start.
    pub exam_id: String,
}

/// Body of `POST /sessions/{id}/violation`.
#[derive(Debug, Deserialize)]
pub struct ReportViolationRequest {
    /// Violation category, e.g. `no_face`.
    pub kind: String,
    /// Escalation weight.
    pub severity: Severity,
    /// Detector confidence in [0, 1].
    pub confidence: f64,
    /// Opaque locator into the external evidence store.
    #[serde(default)]
    pub evidence_ref: Option<String>,
}

/// Response of `POST /sessions/{id}/violation`.
#[derive(Debug, Serialize)]
pub struct ViolationOutcomeResponse {
    /// Warning count after the report.
    pub warning_count: u32,
    /// Session status after the report.
    pub status: SessionStatus,
    /// Violation type that triggered termination, if this report did.
    pub termination_reason: Option<String>,
}

/// Body of `POST /sessions/{id}/submit`.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Answer map keyed by question identifier.
    pub answers: HashMap<String, String>,
}

/// Query of `GET /sessions/{id}/validate`.
#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    /// Candidate claiming the session.
    pub candidate_id: String,
}

/// Response of `GET /sessions/{id}/validate`.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    /// Always true on the success path; failures map to error statuses.
    pub valid: bool,
}

/// Body of `POST /verifications`.
#[derive(Debug, Deserialize)]
pub struct RecordVerificationRequest {
    /// Candidate the check was performed for.
    pub user_id: String,
    /// Exam the check gates.
    pub exam_id: String,
    /// Cosine similarity reported by the verification caller.
    pub similarity_score: f64,
}

/// `POST /sessions/start` — create a session if the identity gate passes.
///
/// # Errors
///
/// Returns 403 if the identity gate blocks the candidate, 500 on storage
/// failure.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartSessionRequest>,
) -> ApiResult<ExamSession> {
    let session = lifecycle::start_session(
        &req.candidate_id,
        &req.exam_id,
        &state.gate,
        &state.sessions,
    )
    .await?;
    Ok(Json(session))
}

/// `POST /sessions/{id}/terminate` — administrative stop, idempotent.
///
/// # Errors
///
/// Returns 404 for an unknown session, 500 on storage failure.
pub async fn terminate_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ExamSession> {
    let session = lifecycle::terminate_session(&id, &state.sessions, &state.locks).await?;
    Ok(Json(session))
}

/// `POST /sessions/{id}/violation` — ingest one detection-pipeline report.
///
/// # Errors
///
/// Returns 404 for an unknown session, 500 on storage failure.
pub async fn report_violation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ReportViolationRequest>,
) -> ApiResult<ViolationOutcomeResponse> {
    let outcome = state
        .engine
        .report_violation(&id, &req.kind, req.severity, req.confidence, req.evidence_ref)
        .await?;
    Ok(Json(ViolationOutcomeResponse {
        warning_count: outcome.warning_count,
        status: outcome.status,
        termination_reason: outcome.termination_reason,
    }))
}

/// `POST /sessions/{id}/submit` — score answers and complete the session.
///
/// # Errors
///
/// Returns 404 for an unknown session, 409 if the session is not active,
/// 500 on storage failure.
pub async fn submit_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> ApiResult<ExamSession> {
    let session = lifecycle::submit_session(
        &id,
        &req.answers,
        &state.sessions,
        &state.questions,
        &state.locks,
    )
    .await?;
    Ok(Json(session))
}

/// `GET /sessions/{id}/validate` — read-only guard before exam interaction.
///
/// # Errors
///
/// Returns 404 for an unknown session, 403 if the session belongs to a
/// different candidate or the identity gate no longer passes, 409 if the
/// session is not active.
pub async fn validate_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(query): Query<ValidateQuery>,
) -> ApiResult<ValidateResponse> {
    lifecycle::validate_session(&id, &query.candidate_id, &state.sessions, &state.gate).await?;
    Ok(Json(ValidateResponse { valid: true }))
}

/// `GET /sessions` — list every session, for the proctoring dashboard.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ExamSession>> {
    let sessions = state.sessions.list_all().await?;
    Ok(Json(sessions))
}

/// `GET /sessions/active` — list sessions currently in progress.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn list_active_sessions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<ExamSession>> {
    let sessions = state.sessions.list_active().await?;
    Ok(Json(sessions))
}

/// `GET /sessions/{id}/violations` — violation history of a session.
///
/// # Errors
///
/// Returns 404 for an unknown session, 500 on storage failure.
pub async fn list_violations(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Violation>> {
    // Surface NotFound for unknown sessions rather than an empty list.
    state.sessions.get_by_id(&id).await?;
    let violations = state.violations.list_for_session(&id).await?;
    Ok(Json(violations))
}

/// `POST /verifications` — record an identity check outcome.
///
/// `success` is derived here from the configured similarity threshold;
/// the gate later trusts the stored boolean.
///
/// # Errors
///
/// Returns 500 on storage failure.
pub async fn record_verification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordVerificationRequest>,
) -> ApiResult<IdentityVerificationLog> {
    let log = IdentityVerificationLog::record(
        req.user_id,
        req.exam_id,
        req.similarity_score,
        state.config.policy.similarity_threshold,
    );
    let stored = state.verifications.create(&log).await?;
    Ok(Json(stored))
}
