//! Question key used by submission scoring.

use serde::{Deserialize, Serialize};

/// The slice of a question that scoring reads: its identifier and the
/// correct option. Question content itself is owned by the exam-content
/// collaborator and never loaded here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct QuestionKey {
    /// Question identifier, the key answers are submitted under.
    pub id: String,
    /// The option counted as correct.
    pub correct_option: String,
}
