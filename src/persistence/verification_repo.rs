//! Identity verification log repository for `SQLite` persistence.
//!
//! Rows are append-only; the gate only ever reads the latest entry for a
//! `(user, exam)` pair.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::verification::IdentityVerificationLog;
use crate::{AppError, Result};

/// Repository wrapper around `SQLite` for identity verification records.
#[derive(Clone)]
pub struct VerificationRepo {
    db: Arc<SqlitePool>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct VerificationRow {
    id: String,
    user_id: String,
    exam_id: String,
    similarity_score: f64,
    success: i64,
    timestamp: String,
}

impl VerificationRow {
    /// Convert a database row into the domain model.
    fn into_log(self) -> Result<IdentityVerificationLog> {
        let timestamp = chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|err| AppError::Db(format!("invalid timestamp: {err}")))?;

        Ok(IdentityVerificationLog {
            id: self.id,
            user_id: self.user_id,
            exam_id: self.exam_id,
            similarity_score: self.similarity_score,
            success: self.success != 0,
            timestamp,
        })
    }
}

impl VerificationRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Append a verification outcome record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, log: &IdentityVerificationLog) -> Result<IdentityVerificationLog> {
        sqlx::query(
            "INSERT INTO identity_verification_log
             (id, user_id, exam_id, similarity_score, success, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.exam_id)
        .bind(log.similarity_score)
        .bind(i64::from(log.success))
        .bind(log.timestamp.to_rfc3339())
        .execute(self.db.as_ref())
        .await?;

        Ok(log.clone())
    }

    /// Retrieve the most recent verification for a `(user, exam)` pair.
    ///
    /// Equal timestamps resolve to the most recently inserted row, so a
    /// same-instant later write wins.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn latest_for(
        &self,
        user_id: &str,
        exam_id: &str,
    ) -> Result<Option<IdentityVerificationLog>> {
        let row: Option<VerificationRow> = sqlx::query_as(
            "SELECT * FROM identity_verification_log
             WHERE user_id = ?1 AND exam_id = ?2
             ORDER BY timestamp DESC, rowid DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(exam_id)
        .fetch_optional(self.db.as_ref())
        .await?;

        row.map(VerificationRow::into_log).transpose()
    }
}
