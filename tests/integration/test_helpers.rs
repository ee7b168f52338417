//! Shared test helpers for integration tests.
//!
//! Provides reusable construction of `AppState`, verified candidates, and
//! active sessions so individual test modules can focus on behaviour
//! rather than boilerplate.

use std::sync::Arc;

use exam_sentry::config::GlobalConfig;
use exam_sentry::http::AppState;
use exam_sentry::lifecycle;
use exam_sentry::models::question::QuestionKey;
use exam_sentry::models::session::ExamSession;
use exam_sentry::models::verification::IdentityVerificationLog;
use exam_sentry::persistence::db;

/// Build a default `GlobalConfig` (warning threshold 3, similarity 0.6).
pub fn test_config() -> GlobalConfig {
    GlobalConfig::from_toml_str("").expect("valid default config")
}

/// Build a complete `AppState` over in-memory `SQLite` with defaults.
pub async fn test_state() -> Arc<AppState> {
    test_state_with(test_config()).await
}

/// Build a complete `AppState` over in-memory `SQLite` with the given config.
pub async fn test_state_with(config: GlobalConfig) -> Arc<AppState> {
    let pool = Arc::new(db::connect_memory().await.expect("in-memory db"));
    Arc::new(AppState::new(Arc::new(config), pool))
}

/// Record a passing identity verification for `(candidate, exam)`.
pub async fn grant_verification(state: &AppState, candidate_id: &str, exam_id: &str) {
    let log = IdentityVerificationLog::record(
        candidate_id.into(),
        exam_id.into(),
        0.9,
        state.config.policy.similarity_threshold,
    );
    state
        .verifications
        .create(&log)
        .await
        .expect("record verification");
}

/// Record a failing identity verification for `(candidate, exam)`.
pub async fn deny_verification(state: &AppState, candidate_id: &str, exam_id: &str) {
    let log = IdentityVerificationLog::record(
        candidate_id.into(),
        exam_id.into(),
        0.1,
        state.config.policy.similarity_threshold,
    );
    state
        .verifications
        .create(&log)
        .await
        .expect("record verification");
}

/// Verify the candidate and start an active session.
pub async fn start_active_session(
    state: &AppState,
    candidate_id: &str,
    exam_id: &str,
) -> ExamSession {
    grant_verification(state, candidate_id, exam_id).await;
    lifecycle::start_session(candidate_id, exam_id, &state.gate, &state.sessions)
        .await
        .expect("start session")
}

/// Seed question keys for an exam.
pub async fn seed_questions(state: &AppState, exam_id: &str, keys: &[(&str, &str)]) {
    for (id, correct) in keys {
        state
            .questions
            .create(
                exam_id,
                &QuestionKey {
                    id: (*id).into(),
                    correct_option: (*correct).into(),
                },
            )
            .await
            .expect("seed question");
    }
}
