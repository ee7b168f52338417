//! Session lifecycle management: start, terminate, submit, validate.
//!
//! Start is gated on the identity verification precondition. Terminate is
//! idempotent once terminal, mirroring the escalation hard stop so every
//! termination path behaves the same. Submit is deliberately NOT
//! idempotent: a retry after an accepted submission must surface as
//! `InvalidTransition` rather than silently re-score.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};

use crate::gate::IdentityGate;
use crate::models::question::QuestionKey;
use crate::models::session::{ExamSession, SessionStatus};
use crate::persistence::locks::SessionLocks;
use crate::persistence::question_repo::QuestionRepo;
use crate::persistence::session_repo::SessionRepo;
use crate::{AppError, Result};

/// Start a new session for a candidate, gated on identity verification.
///
/// # Errors
///
/// Returns `AppError::PreconditionFailed` if the latest identity
/// verification for the `(candidate, exam)` pair is missing or failed,
/// or `AppError::Db` if persistence fails.
pub async fn start_session(
    candidate_id: &str,
    exam_id: &str,
    gate: &IdentityGate,
    sessions: &SessionRepo,
) -> Result<ExamSession> {
    if !gate.can_start(candidate_id, exam_id).await? {
        warn!(candidate_id, exam_id, "session start blocked by identity gate");
        return Err(AppError::PreconditionFailed(
            "identity verification required before starting the exam".into(),
        ));
    }

    let session = sessions
        .create(&ExamSession::new(candidate_id.to_owned(), exam_id.to_owned()))
        .await?;

    info!(session_id = %session.id, candidate_id, exam_id, "session started");
    Ok(session)
}

/// Terminate a session administratively.
///
/// Idempotent: calling on an already-terminal session is a no-op that
/// returns the current state rather than an error.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the session does not exist, or
/// `AppError::Db` if persistence fails.
pub async fn terminate_session(
    session_id: &str,
    sessions: &SessionRepo,
    locks: &SessionLocks,
) -> Result<ExamSession> {
    let _session_guard = locks.acquire(session_id).await;

    let mut session = sessions.get_by_id(session_id).await?;

    if session.status.is_terminal() {
        info!(
            session_id,
            status = ?session.status,
            "terminate on already-terminal session is a no-op"
        );
        return Ok(session);
    }

    session.status = SessionStatus::Terminated;
    session.ended_at = Some(Utc::now());
    sessions.update(&session).await?;

    info!(session_id, "session terminated");
    Ok(session)
}

/// Submit answers for a session, scoring them against the exam's question
/// set and completing the session.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the session does not exist,
/// `AppError::InvalidTransition` if the session is not `Active`, or
/// `AppError::Db` if persistence fails.
pub async fn submit_session(
    session_id: &str,
    answers: &HashMap<String, String>,
    sessions: &SessionRepo,
    questions: &QuestionRepo,
    locks: &SessionLocks,
) -> Result<ExamSession> {
    let _session_guard = locks.acquire(session_id).await;

    let mut session = sessions.get_by_id(session_id).await?;

    if session.status != SessionStatus::Active {
        return Err(AppError::InvalidTransition(format!(
            "cannot submit session {session_id} in status {:?}",
            session.status
        )));
    }

    let question_set = questions.question_set(&session.exam_id).await?;
    let (score, total) = score_answers(answers, &question_set);

    let now = Utc::now();
    session.status = SessionStatus::Completed;
    session.score = Some(score);
    session.total_questions = Some(total);
    session.submitted_at = Some(now);
    session.ended_at = Some(now);
    sessions.update(&session).await?;

    info!(session_id, score, total, "session submitted and scored");
    Ok(session)
}

/// Read-only guard consulted before allowing exam interaction.
///
/// Passes only when the session exists, belongs to the candidate, is
/// `Active`, and the identity gate currently reflects success for the
/// `(candidate, exam)` pair. The gate is re-checked on every call, not
/// cached from start time.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the session does not exist,
/// `AppError::Forbidden` if it belongs to a different candidate,
/// `AppError::InvalidTransition` if it is not `Active`, or
/// `AppError::PreconditionFailed` if the identity gate no longer passes.
pub async fn validate_session(
    session_id: &str,
    candidate_id: &str,
    sessions: &SessionRepo,
    gate: &IdentityGate,
) -> Result<()> {
    let session = sessions.get_by_id(session_id).await?;

    if session.candidate_id != candidate_id {
        return Err(AppError::Forbidden(format!(
            "session {session_id} belongs to a different candidate"
        )));
    }

    if session.status != SessionStatus::Active {
        return Err(AppError::InvalidTransition(format!(
            "session {session_id} is not active"
        )));
    }

    if !gate.can_start(candidate_id, &session.exam_id).await? {
        return Err(AppError::PreconditionFailed(
            "identity verification no longer valid for this session".into(),
        ));
    }

    Ok(())
}

/// Score an answer map against a question set: one point per answer
/// matching the question's correct option. Unanswered and unknown
/// question keys score nothing.
#[must_use]
pub fn score_answers(
    answers: &HashMap<String, String>,
    question_set: &[QuestionKey],
) -> (u32, u32) {
    let score = question_set
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
        .count();
    let total = question_set.len();

    // Question sets are bounded far below u32::MAX in practice.
    (
        u32::try_from(score).unwrap_or(u32::MAX),
        u32::try_from(total).unwrap_or(u32::MAX),
    )
}
