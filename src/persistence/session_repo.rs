//! Exam session repository for `SQLite` persistence.
//!
//! This is the session store's write side: all mutations to a session row
//! go through here, and the escalation path commits the violation row and
//! the session mutation as one transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::session::{ExamSession, SessionStatus};
use crate::models::violation::Violation;
use crate::{AppError, Result};

use super::violation_repo;

/// Repository wrapper around `SQLite` for exam session records.
#[derive(Clone)]
pub struct SessionRepo {
    db: Arc<SqlitePool>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    candidate_id: String,
    exam_id: String,
    status: String,
    warning_count: i64,
    started_at: String,
    ended_at: Option<String>,
    termination_reason: Option<String>,
    score: Option<i64>,
    total_questions: Option<i64>,
    submitted_at: Option<String>,
}

impl SessionRow {
    /// Convert a database row into the domain model.
    fn into_session(self) -> Result<ExamSession> {
        let status = parse_session_status(&self.status)?;
        let warning_count = u32::try_from(self.warning_count)
            .map_err(|_| AppError::Db(format!("negative warning_count: {}", self.warning_count)))?;
        let score = self
            .score
            .map(|s| u32::try_from(s).map_err(|_| AppError::Db(format!("negative score: {s}"))))
            .transpose()?;
        let total_questions = self
            .total_questions
            .map(|t| {
                u32::try_from(t).map_err(|_| AppError::Db(format!("negative total_questions: {t}")))
            })
            .transpose()?;

        Ok(ExamSession {
            id: self.id,
            candidate_id: self.candidate_id,
            exam_id: self.exam_id,
            status,
            warning_count,
            started_at: parse_timestamp(&self.started_at, "started_at")?,
            ended_at: parse_optional_timestamp(self.ended_at.as_deref(), "ended_at")?,
            termination_reason: self.termination_reason,
            score,
            total_questions,
            submitted_at: parse_optional_timestamp(self.submitted_at.as_deref(), "submitted_at")?,
        })
    }
}

fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| AppError::Db(format!("invalid {column}: {err}")))
}

fn parse_optional_timestamp(raw: Option<&str>, column: &str) -> Result<Option<DateTime<Utc>>> {
    raw.map(|s| parse_timestamp(s, column)).transpose()
}

fn parse_session_status(s: &str) -> Result<SessionStatus> {
    match s {
        "active" => Ok(SessionStatus::Active),
        "terminated" => Ok(SessionStatus::Terminated),
        "completed" => Ok(SessionStatus::Completed),
        other => Err(AppError::Db(format!("invalid session status: {other}"))),
    }
}

fn session_status_str(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Active => "active",
        SessionStatus::Terminated => "terminated",
        SessionStatus::Completed => "completed",
    }
}

/// Write every mutable column of a session row through the given connection.
///
/// Shared between the plain update path and the escalation transaction.
async fn update_session_row(
    conn: &mut sqlx::SqliteConnection,
    session: &ExamSession,
) -> Result<()> {
    let result = sqlx::query(
        "UPDATE exam_session SET status = ?1, warning_count = ?2, ended_at = ?3,
         termination_reason = ?4, score = ?5, total_questions = ?6, submitted_at = ?7
         WHERE id = ?8",
    )
    .bind(session_status_str(session.status))
    .bind(i64::from(session.warning_count))
    .bind(session.ended_at.map(|dt| dt.to_rfc3339()))
    .bind(&session.termination_reason)
    .bind(session.score.map(i64::from))
    .bind(session.total_questions.map(i64::from))
    .bind(session.submitted_at.map(|dt| dt.to_rfc3339()))
    .bind(&session.id)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "session {} not found",
            session.id
        )));
    }
    Ok(())
}

impl SessionRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a new session record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, session: &ExamSession) -> Result<ExamSession> {
        sqlx::query(
            "INSERT INTO exam_session (id, candidate_id, exam_id, status, warning_count,
             started_at, ended_at, termination_reason, score, total_questions, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&session.id)
        .bind(&session.candidate_id)
        .bind(&session.exam_id)
        .bind(session_status_str(session.status))
        .bind(i64::from(session.warning_count))
        .bind(session.started_at.to_rfc3339())
        .bind(session.ended_at.map(|dt| dt.to_rfc3339()))
        .bind(&session.termination_reason)
        .bind(session.score.map(i64::from))
        .bind(session.total_questions.map(i64::from))
        .bind(session.submitted_at.map(|dt| dt.to_rfc3339()))
        .execute(self.db.as_ref())
        .await?;

        Ok(session.clone())
    }

    /// Retrieve a session by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the session does not exist.
    pub async fn get_by_id(&self, id: &str) -> Result<ExamSession> {
        let row: Option<SessionRow> = sqlx::query_as("SELECT * FROM exam_session WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.db.as_ref())
            .await?;

        row.ok_or_else(|| AppError::NotFound(format!("session {id} not found")))?
            .into_session()
    }

    /// Write every mutable column of the session back to the store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the row no longer exists, or
    /// `AppError::Db` if the update fails.
    pub async fn update(&self, session: &ExamSession) -> Result<()> {
        let mut conn = self.db.acquire().await?;
        update_session_row(&mut conn, session).await
    }

    /// Persist an escalation outcome: the new violation row and the mutated
    /// session row commit together as one durable unit.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the transaction fails; nothing is written
    /// in that case.
    pub async fn persist_escalation(
        &self,
        session: &ExamSession,
        violation: &Violation,
    ) -> Result<()> {
        let mut tx = self.db.begin().await?;
        violation_repo::insert_violation(&mut *tx, violation).await?;
        update_session_row(&mut *tx, session).await?;
        tx.commit().await?;
        Ok(())
    }

    /// List all sessions, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<ExamSession>> {
        let rows: Vec<SessionRow> =
            sqlx::query_as("SELECT * FROM exam_session ORDER BY started_at DESC")
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// List sessions currently in the `Active` state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_active(&self) -> Result<Vec<ExamSession>> {
        let rows: Vec<SessionRow> = sqlx::query_as(
            "SELECT * FROM exam_session WHERE status = 'active' ORDER BY started_at DESC",
        )
        .fetch_all(self.db.as_ref())
        .await?;

        rows.into_iter().map(SessionRow::into_session).collect()
    }

    /// Count sessions currently in the `Active` state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_active(&self) -> Result<u64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM exam_session WHERE status = 'active'")
                .fetch_one(self.db.as_ref())
                .await?;
        u64::try_from(row.0).map_err(|_| AppError::Db(format!("negative count: {}", row.0)))
    }
}
