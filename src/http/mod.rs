//! HTTP transport for the proctoring API.
//!
//! Mounts the session lifecycle, violation reporting, verification
//! recording, and monitoring routes behind an axum router.

pub mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::escalation::EscalationEngine;
use crate::gate::IdentityGate;
use crate::persistence::locks::SessionLocks;
use crate::persistence::question_repo::QuestionRepo;
use crate::persistence::session_repo::SessionRepo;
use crate::persistence::verification_repo::VerificationRepo;
use crate::persistence::violation_repo::ViolationRepo;
use crate::{AppError, GlobalConfig, Result};

/// Shared application state accessible by all request handlers.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Session store repositories.
    pub sessions: SessionRepo,
    /// Violation audit log.
    pub violations: ViolationRepo,
    /// Identity verification log.
    pub verifications: VerificationRepo,
    /// Question keys for submission scoring.
    pub questions: QuestionRepo,
    /// Identity gate over the verification log.
    pub gate: IdentityGate,
    /// Violation escalation engine.
    pub engine: EscalationEngine,
    /// Per-session mutual-exclusion registry.
    pub locks: Arc<SessionLocks>,
}

impl AppState {
    /// Wire up repositories, gate, and engine over a connected pool.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>, db: Arc<SqlitePool>) -> Self {
        let sessions = SessionRepo::new(Arc::clone(&db));
        let violations = ViolationRepo::new(Arc::clone(&db));
        let verifications = VerificationRepo::new(Arc::clone(&db));
        let questions = QuestionRepo::new(Arc::clone(&db));
        let gate = IdentityGate::new(verifications.clone());
        let locks = Arc::new(SessionLocks::new());
        let engine = EscalationEngine::new(
            sessions.clone(),
            Arc::clone(&locks),
            config.policy.warning_threshold,
        );

        Self {
            config,
            sessions,
            violations,
            verifications,
            questions,
            gate,
            engine,
            locks,
        }
    }
}

/// Handler for `GET /health` — returns 200 OK with a plain-text body.
///
/// Useful for probing liveness without touching the database.
async fn health() -> &'static str {
    "ok"
}

/// Build the proctoring API router over shared state.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/active", get(handlers::list_active_sessions))
        .route(
            "/sessions/{id}/terminate",
            post(handlers::terminate_session),
        )
        .route("/sessions/{id}/violation", post(handlers::report_violation))
        .route("/sessions/{id}/violations", get(handlers::list_violations))
        .route("/sessions/{id}/submit", post(handlers::submit_session))
        .route("/sessions/{id}/validate", get(handlers::validate_session))
        .route("/verifications", post(handlers::record_verification))
        .with_state(state)
}

/// Serve the proctoring API on `config.http_port` until cancelled.
///
/// # Errors
///
/// Returns `AppError::Config` if the server fails to bind or errors while
/// serving.
pub async fn serve(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let port = state.config.http_port;
    let bind = SocketAddr::from(([127, 0, 0, 1], port));

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind API on {bind}: {err}")))?;

    info!(%bind, "starting proctoring API");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            ct.cancelled().await;
        })
        .await
        .map_err(|err| AppError::Config(format!("API server error: {err}")))?;

    info!("proctoring API shut down");
    Ok(())
}
