//! Violation repository for `SQLite` persistence.
//!
//! Violations are append-only audit records; there is no update path.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::violation::{Severity, Violation};
use crate::{AppError, Result};

/// Repository wrapper around `SQLite` for violation records.
#[derive(Clone)]
pub struct ViolationRepo {
    db: Arc<SqlitePool>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct ViolationRow {
    id: String,
    session_id: String,
    kind: String,
    severity: String,
    confidence: f64,
    evidence_ref: Option<String>,
    timestamp: String,
}

impl ViolationRow {
    /// Convert a database row into the domain model.
    fn into_violation(self) -> Result<Violation> {
        let severity = parse_severity(&self.severity)?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|err| AppError::Db(format!("invalid timestamp: {err}")))?;

        Ok(Violation {
            id: self.id,
            session_id: self.session_id,
            kind: self.kind,
            severity,
            confidence: self.confidence,
            evidence_ref: self.evidence_ref,
            timestamp,
        })
    }
}

fn parse_severity(s: &str) -> Result<Severity> {
    match s {
        "low" => Ok(Severity::Low),
        "medium" => Ok(Severity::Medium),
        "high" => Ok(Severity::High),
        other => Err(AppError::Db(format!("invalid severity: {other}"))),
    }
}

fn severity_str(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "low",
        Severity::Medium => "medium",
        Severity::High => "high",
    }
}

/// Insert a violation row through the given connection.
///
/// Shared with the session store so the escalation path can append the
/// violation inside the same transaction that mutates the session.
pub(crate) async fn insert_violation(
    conn: &mut sqlx::SqliteConnection,
    violation: &Violation,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO violation (id, session_id, kind, severity, confidence, evidence_ref, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&violation.id)
    .bind(&violation.session_id)
    .bind(&violation.kind)
    .bind(severity_str(violation.severity))
    .bind(violation.confidence)
    .bind(&violation.evidence_ref)
    .bind(violation.timestamp.to_rfc3339())
    .execute(conn)
    .await?;
    Ok(())
}

impl ViolationRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Append a violation record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, violation: &Violation) -> Result<Violation> {
        let mut conn = self.db.acquire().await?;
        insert_violation(&mut conn, violation).await?;
        Ok(violation.clone())
    }

    /// List the violation history of a session in ingestion order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_session(&self, session_id: &str) -> Result<Vec<Violation>> {
        let rows: Vec<ViolationRow> =
            sqlx::query_as("SELECT * FROM violation WHERE session_id = ?1 ORDER BY rowid")
                .bind(session_id)
                .fetch_all(self.db.as_ref())
                .await?;

        rows.into_iter().map(ViolationRow::into_violation).collect()
    }

    /// Count the violations recorded for a session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn count_for_session(&self, session_id: &str) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM violation WHERE session_id = ?1")
            .bind(session_id)
            .fetch_one(self.db.as_ref())
            .await?;
        u64::try_from(row.0).map_err(|_| AppError::Db(format!("negative count: {}", row.0)))
    }
}
