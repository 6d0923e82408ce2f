//! The attempt registry.
//!
//! Tracks every launched connection attempt until the coordinator retires
//! it. A scan is finished exactly when the registry is empty.

use crate::types::Port;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;

/// Identifies one attempt within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttemptId(u64);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bookkeeping for an attempt that has not been retired yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAttempt {
    pub port: Port,
    pub started: Instant,
}

/// Registry of in-flight attempts, safe to share between tasks.
///
/// Every operation takes the same lock, so registration, retirement and
/// inspection are linearizable. An attempt can be retired only once; later
/// calls for the same id return `None`.
#[derive(Debug, Default)]
pub struct AttemptRegistry {
    attempts: Mutex<HashMap<AttemptId, PendingAttempt>>,
    next_id: AtomicU64,
}

impl AttemptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pending attempt for `port`.
    pub fn register(&self, port: Port) -> AttemptId {
        let id = AttemptId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let attempt = PendingAttempt {
            port,
            started: Instant::now(),
        };
        self.lock().insert(id, attempt);
        id
    }

    /// Remove an attempt. Returns `None` if it was already retired.
    pub fn retire(&self, id: AttemptId) -> Option<PendingAttempt> {
        self.lock().remove(&id)
    }

    /// Number of pending attempts.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Retire everything that is left, oldest first.
    pub fn drain(&self) -> Vec<(AttemptId, PendingAttempt)> {
        let mut left: Vec<_> = self.lock().drain().collect();
        left.sort_unstable_by_key(|(id, _)| *id);
        left
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<AttemptId, PendingAttempt>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
