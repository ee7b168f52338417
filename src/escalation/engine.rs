//! Violation escalation engine.
//!
//! Sole writer of `warning_count` and of the Active→Terminated transition
//! for reported violations. Each report executes as one atomic unit per
//! session: the per-session lock is held across the whole read-decide-write
//! sequence, and the violation row commits in the same transaction as the
//! session mutation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::models::session::SessionStatus;
use crate::models::violation::{Severity, Violation};
use crate::persistence::locks::SessionLocks;
use crate::persistence::session_repo::SessionRepo;
use crate::Result;

/// Result of ingesting one violation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationOutcome {
    /// Warning count after the report was applied (or the unchanged count
    /// when the hard stop fired).
    pub warning_count: u32,
    /// Session status after the report was applied.
    pub status: SessionStatus,
    /// Violation type that triggered termination, when this report
    /// terminated the session.
    pub termination_reason: Option<String>,
}

/// Consumes violation reports and decides escalation, one session at a time.
#[derive(Clone)]
pub struct EscalationEngine {
    sessions: SessionRepo,
    locks: Arc<SessionLocks>,
    warning_threshold: u32,
}

impl EscalationEngine {
    /// Create an engine over the session store.
    ///
    /// `warning_threshold` is the accumulated Low/Medium count at which a
    /// session terminates.
    #[must_use]
    pub fn new(sessions: SessionRepo, locks: Arc<SessionLocks>, warning_threshold: u32) -> Self {
        Self {
            sessions,
            locks,
            warning_threshold,
        }
    }

    /// Ingest one violation report and return the resulting session state.
    ///
    /// Reports against a session that already left `Active` are a
    /// successful no-op: no violation row is written, no counter moves,
    /// and the current state is returned. A fast-reporting pipeline racing
    /// a termination decision is expected, not exceptional.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the session does not exist, or
    /// `AppError::Db` if persistence fails (in which case nothing was
    /// written).
    pub async fn report_violation(
        &self,
        session_id: &str,
        kind: &str,
        severity: Severity,
        confidence: f64,
        evidence_ref: Option<String>,
    ) -> Result<ViolationOutcome> {
        // Serialize with every other Active→terminal path for this session.
        let _session_guard = self.locks.acquire(session_id).await;

        let mut session = self.sessions.get_by_id(session_id).await?;

        // Hard stop: the session already left Active.
        if session.status != SessionStatus::Active {
            debug!(
                session_id,
                status = ?session.status,
                kind,
                "dropping violation report for non-active session"
            );
            return Ok(ViolationOutcome {
                warning_count: session.warning_count,
                status: session.status,
                termination_reason: None,
            });
        }

        let violation = Violation::new(
            session_id.to_owned(),
            kind.to_owned(),
            severity,
            confidence,
            evidence_ref,
        );

        if severity.counts_toward_warnings() {
            session.warning_count += 1;
        }

        let mut termination_reason = None;
        if severity.escalates_immediately() || session.warning_count >= self.warning_threshold {
            session.status = SessionStatus::Terminated;
            session.ended_at = Some(Utc::now());
            session.termination_reason = Some(violation.kind.clone());
            termination_reason = Some(violation.kind.clone());
            warn!(
                session_id,
                kind,
                ?severity,
                warning_count = session.warning_count,
                "escalation terminated session"
            );
        }

        self.sessions
            .persist_escalation(&session, &violation)
            .await?;

        info!(
            session_id,
            kind,
            ?severity,
            warning_count = session.warning_count,
            status = ?session.status,
            "violation recorded"
        );

        Ok(ViolationOutcome {
            warning_count: session.warning_count,
            status: session.status,
            termination_reason,
        })
    }
}
