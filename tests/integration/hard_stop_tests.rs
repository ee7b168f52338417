//! The hard stop: once a session leaves `Active`, further reports and
//! terminates are silent no-ops and submissions surface clearly.

use exam_sentry::lifecycle;
use exam_sentry::models::session::SessionStatus;
use exam_sentry::models::violation::Severity;
use exam_sentry::AppError;

use super::test_helpers::{start_active_session, test_state};

#[tokio::test]
async fn reports_after_termination_change_nothing() {
    let state = test_state().await;
    let session = start_active_session(&state, "cand-1", "exam-1").await;

    state
        .engine
        .report_violation(&session.id, "mobile_phone_detected", Severity::High, 0.95, None)
        .await
        .expect("terminating report");

    // A fast pipeline keeps reporting after the termination decision.
    for _ in 0..3 {
        let outcome = state
            .engine
            .report_violation(&session.id, "no_face", Severity::Low, 0.9, None)
            .await
            .expect("post-termination report is a successful no-op");
        assert_eq!(outcome.status, SessionStatus::Terminated);
        assert_eq!(outcome.warning_count, 0);
        assert!(outcome.termination_reason.is_none());
    }

    // Only the terminating violation was recorded.
    let history = state
        .violations
        .list_for_session(&session.id)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);

    let stored = state.sessions.get_by_id(&session.id).await.expect("fetch");
    assert_eq!(stored.warning_count, 0);
    assert_eq!(
        stored.termination_reason.as_deref(),
        Some("mobile_phone_detected")
    );
}

#[tokio::test]
async fn reports_after_completion_change_nothing() {
    let state = test_state().await;
    let session = start_active_session(&state, "cand-1", "exam-1").await;

    lifecycle::submit_session(
        &session.id,
        &std::collections::HashMap::new(),
        &state.sessions,
        &state.questions,
        &state.locks,
    )
    .await
    .expect("submit");

    let outcome = state
        .engine
        .report_violation(&session.id, "no_face", Severity::Low, 0.9, None)
        .await
        .expect("post-completion report is a successful no-op");
    assert_eq!(outcome.status, SessionStatus::Completed);
    assert_eq!(outcome.warning_count, 0);

    let history = state
        .violations
        .list_for_session(&session.id)
        .await
        .expect("history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn terminate_is_idempotent() {
    let state = test_state().await;
    let session = start_active_session(&state, "cand-1", "exam-1").await;

    let first = lifecycle::terminate_session(&session.id, &state.sessions, &state.locks)
        .await
        .expect("first terminate");
    assert_eq!(first.status, SessionStatus::Terminated);
    let ended_at = first.ended_at.expect("ended_at set");

    let second = lifecycle::terminate_session(&session.id, &state.sessions, &state.locks)
        .await
        .expect("second terminate is a no-op");
    assert_eq!(second.status, SessionStatus::Terminated);
    assert_eq!(second.ended_at, Some(ended_at), "ended_at is set exactly once");
}

#[tokio::test]
async fn submission_is_not_idempotent() {
    let state = test_state().await;
    let session = start_active_session(&state, "cand-1", "exam-1").await;

    lifecycle::submit_session(
        &session.id,
        &std::collections::HashMap::new(),
        &state.sessions,
        &state.questions,
        &state.locks,
    )
    .await
    .expect("first submit");

    let err = lifecycle::submit_session(
        &session.id,
        &std::collections::HashMap::new(),
        &state.sessions,
        &state.questions,
        &state.locks,
    )
    .await
    .expect_err("retry after accepted submission must surface");
    assert!(matches!(err, AppError::InvalidTransition(_)));
}
