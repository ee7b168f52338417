//! Violation model and severity policy predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a reported violation, ordered by escalation weight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Minor incident; accrues a warning.
    Low,
    /// Moderate incident; accrues a warning.
    Medium,
    /// Major incident; terminates the session directly.
    High,
}

impl Severity {
    /// Whether this severity increments the session warning counter.
    ///
    /// `High` deliberately does not: it terminates without counting, a
    /// two-track policy (accumulation of minor incidents vs. immediate
    /// stop on a major one).
    #[must_use]
    pub fn counts_toward_warnings(self) -> bool {
        matches!(self, Self::Low | Self::Medium)
    }

    /// Whether this severity terminates the session regardless of the
    /// warning counter.
    #[must_use]
    pub fn escalates_immediately(self) -> bool {
        matches!(self, Self::High)
    }
}

/// One reported integrity incident, append-only once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Violation {
    /// Unique record identifier.
    pub id: String,
    /// Owning session; immutable.
    pub session_id: String,
    /// Free-form category, e.g. `no_face` or `mobile_phone_detected`.
    pub kind: String,
    /// Escalation weight.
    pub severity: Severity,
    /// Detector confidence in [0, 1]; informational, never used in the
    /// escalation decision.
    pub confidence: f64,
    /// Opaque locator into the external evidence store.
    pub evidence_ref: Option<String>,
    /// Ingestion timestamp.
    pub timestamp: DateTime<Utc>,
}

impl Violation {
    /// Construct a violation record with a generated identifier and the
    /// current ingestion timestamp.
    #[must_use]
    pub fn new(
        session_id: String,
        kind: String,
        severity: Severity,
        confidence: f64,
        evidence_ref: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            kind,
            severity,
            confidence,
            evidence_ref,
            timestamp: Utc::now(),
        }
    }
}
