//! Identity gate: the precondition check for starting or continuing a
//! session.
//!
//! The gate reads only the most recent verification outcome for a
//! `(user, exam)` pair and trusts the stored `success` boolean — similarity
//! is computed and thresholded by the verification caller at recording
//! time. Absence of any record is treated as failure (fail-closed).

use tracing::debug;

use crate::persistence::verification_repo::VerificationRepo;
use crate::Result;

/// Evaluates whether a candidate may start (or continue) an exam session.
#[derive(Clone)]
pub struct IdentityGate {
    verifications: VerificationRepo,
}

impl IdentityGate {
    /// Create a gate over the verification log.
    #[must_use]
    pub fn new(verifications: VerificationRepo) -> Self {
        Self { verifications }
    }

    /// Whether the latest verification for `(user, exam)` succeeded.
    ///
    /// Returns `false` when no verification exists. This is a pure read;
    /// a storage failure propagates as an infrastructure error, never as
    /// a gate decision.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the verification log cannot be read.
    pub async fn can_start(&self, user_id: &str, exam_id: &str) -> Result<bool> {
        let latest = self.verifications.latest_for(user_id, exam_id).await?;
        let allowed = latest.as_ref().is_some_and(|log| log.success);
        debug!(
            user_id,
            exam_id,
            allowed,
            has_record = latest.is_some(),
            "identity gate evaluated"
        );
        Ok(allowed)
    }
}
