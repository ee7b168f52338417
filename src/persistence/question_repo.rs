//! Question key repository for `SQLite` persistence.
//!
//! Read-only input to submission scoring. Rows are seeded by the external
//! exam-content service; this crate never authors question content.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::question::QuestionKey;
use crate::Result;

/// Repository wrapper around `SQLite` for question keys.
#[derive(Clone)]
pub struct QuestionRepo {
    db: Arc<SqlitePool>,
}

/// Internal row struct for `SQLite` deserialization.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: String,
    correct_option: String,
}

impl QuestionRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a question key for an exam.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the database insert fails.
    pub async fn create(&self, exam_id: &str, question: &QuestionKey) -> Result<()> {
        sqlx::query("INSERT INTO question (id, exam_id, correct_option) VALUES (?1, ?2, ?3)")
            .bind(&question.id)
            .bind(exam_id)
            .bind(&question.correct_option)
            .execute(self.db.as_ref())
            .await?;
        Ok(())
    }

    /// Retrieve the question key set for an exam.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn question_set(&self, exam_id: &str) -> Result<Vec<QuestionKey>> {
        let rows: Vec<QuestionRow> = sqlx::query_as(
            "SELECT id, correct_option FROM question WHERE exam_id = ?1 ORDER BY rowid",
        )
        .bind(exam_id)
        .fetch_all(self.db.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| QuestionKey {
                id: row.id,
                correct_option: row.correct_option,
            })
            .collect())
    }
}
