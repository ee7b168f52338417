//! Exam session model and lifecycle helpers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status for an exam session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Candidate is taking the exam; violations accrue warnings.
    Active,
    /// Session stopped by escalation or an explicit administrative stop.
    Terminated,
    /// Candidate submitted answers and the session was scored.
    Completed,
}

impl SessionStatus {
    /// Whether the status admits no further transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated | Self::Completed)
    }
}

/// One candidate's attempt at one exam, persisted in `SQLite`.
///
/// `warning_count` only changes while the session is `Active`, and
/// `ended_at` is set exactly once, when the session leaves `Active`.
/// Sessions are never deleted; they are the audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ExamSession {
    /// Unique record identifier.
    pub id: String,
    /// Owning candidate; immutable after creation.
    pub candidate_id: String,
    /// Exam being attempted; immutable after creation.
    pub exam_id: String,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Accumulated Low/Medium violation warnings.
    pub warning_count: u32,
    /// Creation timestamp.
    pub started_at: DateTime<Utc>,
    /// Set once, when the session leaves `Active`.
    pub ended_at: Option<DateTime<Utc>>,
    /// Violation type that triggered termination, if any.
    pub termination_reason: Option<String>,
    /// Correct answers counted at submission.
    pub score: Option<u32>,
    /// Size of the scored question set.
    pub total_questions: Option<u32>,
    /// Submission timestamp.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ExamSession {
    /// Construct a new active session with a generated identifier.
    #[must_use]
    pub fn new(candidate_id: String, exam_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            candidate_id,
            exam_id,
            status: SessionStatus::Active,
            warning_count: 0,
            started_at: Utc::now(),
            ended_at: None,
            termination_reason: None,
            score: None,
            total_questions: None,
            submitted_at: None,
        }
    }

    /// Determine whether a lifecycle transition is permitted.
    ///
    /// `Terminated` and `Completed` are both terminal; the only legal
    /// moves are out of `Active`.
    #[must_use]
    pub fn can_transition_to(&self, next: SessionStatus) -> bool {
        matches!(
            (self.status, next),
            (
                SessionStatus::Active,
                SessionStatus::Terminated | SessionStatus::Completed
            )
        )
    }
}
