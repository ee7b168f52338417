//! Identity verification log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One identity check outcome for a `(user, exam)` pair, append-only.
///
/// `success` is derived once at recording time from the similarity score
/// and the configured threshold; the Identity Gate trusts the stored
/// boolean and never recomputes similarity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct IdentityVerificationLog {
    /// Unique record identifier.
    pub id: String,
    /// Candidate the check was performed for.
    pub user_id: String,
    /// Exam the check gates.
    pub exam_id: String,
    /// Cosine similarity in [-1, 1] reported by the verification caller.
    pub similarity_score: f64,
    /// Whether the similarity met the threshold at recording time.
    pub success: bool,
    /// Recording timestamp.
    pub timestamp: DateTime<Utc>,
}

impl IdentityVerificationLog {
    /// Record a verification outcome, deriving `success` from the
    /// similarity score and threshold.
    #[must_use]
    pub fn record(user_id: String, exam_id: String, similarity_score: f64, threshold: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            exam_id,
            similarity_score,
            success: similarity_score >= threshold,
            timestamp: Utc::now(),
        }
    }
}
