//! Violation escalation: warning accrual and termination policy.

pub mod engine;

pub use engine::{EscalationEngine, ViolationOutcome};
