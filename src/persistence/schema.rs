//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// Creates all four tables idempotently. Safe to call on every startup.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS exam_session (
    id                  TEXT PRIMARY KEY NOT NULL,
    candidate_id        TEXT NOT NULL,
    exam_id             TEXT NOT NULL,
    status              TEXT NOT NULL CHECK(status IN ('active','terminated','completed')),
    warning_count       INTEGER NOT NULL DEFAULT 0,
    started_at          TEXT NOT NULL,
    ended_at            TEXT,
    termination_reason  TEXT,
    score               INTEGER,
    total_questions     INTEGER,
    submitted_at        TEXT
);

CREATE TABLE IF NOT EXISTS violation (
    id              TEXT PRIMARY KEY NOT NULL,
    session_id      TEXT NOT NULL,
    kind            TEXT NOT NULL,
    severity        TEXT NOT NULL CHECK(severity IN ('low','medium','high')),
    confidence      REAL NOT NULL,
    evidence_ref    TEXT,
    timestamp       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS identity_verification_log (
    id                  TEXT PRIMARY KEY NOT NULL,
    user_id             TEXT NOT NULL,
    exam_id             TEXT NOT NULL,
    similarity_score    REAL NOT NULL,
    success             INTEGER NOT NULL,
    timestamp           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS question (
    id              TEXT PRIMARY KEY NOT NULL,
    exam_id         TEXT NOT NULL,
    correct_option  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_session_status ON exam_session(status);
CREATE INDEX IF NOT EXISTS idx_violation_session ON violation(session_id);
CREATE INDEX IF NOT EXISTS idx_verification_user_exam ON identity_verification_log(user_id, exam_id);
CREATE INDEX IF NOT EXISTS idx_question_exam ON question(exam_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
