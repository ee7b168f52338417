//! Per-session mutual-exclusion registry.
//!
//! Every Active→terminal path (violation escalation, administrative
//! terminate, submission) serializes through the same per-session lock,
//! held across the whole read-decide-write transaction. Operations on
//! different sessions never contend.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-session async mutexes keyed by session identifier.
///
/// Entries are created on first use and kept for the registry's lifetime;
/// sessions are never deleted, so the map is bounded by the session count.
#[derive(Default)]
pub struct SessionLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SessionLocks {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a session, waiting if another operation on the
    /// same session currently holds it.
    ///
    /// The returned guard owns the lock; dropping it releases the session.
    pub async fn acquire(&self, session_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            Arc::clone(
                map.entry(session_id.to_owned())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }
}
