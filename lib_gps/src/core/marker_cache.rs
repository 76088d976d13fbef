//! # Marker Cache
//!
//! Exactly one snapshot is current at any time. The refresh loop builds a new
//! one off to the side and installs it with [`MarkerCache::replace`], which only
//! swaps an `Arc` under the write lock. [`MarkerCache::read`] clones that `Arc`
//! under the read lock, so readers never wait on a parse and never observe a
//! mix of two refreshes.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;

use super::refresh_status::{RefreshState, RefreshStatus};
use crate::markers::Snapshot;

/// Shared store for the latest snapshot.
#[derive(Debug, Default)]
pub struct MarkerCache {
    current: RwLock<Arc<Snapshot>>,
    status: Mutex<RefreshStatus>,
}

impl MarkerCache {
    /// Creates a cache holding an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `snapshot` as current. The previous snapshot is dropped once
    /// the last reader holding it lets go.
    pub fn replace(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        {
            // A poisoned lock still guards a valid Arc; keep serving it.
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *current = next;
        }

        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.last_success = Some(Utc::now());
        status.last_error = None;
        status.successes += 1;
    }

    /// Returns the current snapshot.
    pub fn read(&self) -> Arc<Snapshot> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*current)
    }

    /// Records a failed refresh cycle. The snapshot is left as it is.
    pub fn record_failure(&self, message: impl Into<String>) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.last_error = Some(message.into());
        status.failures += 1;
    }

    /// Updates the loop state reported by [`MarkerCache::status`].
    pub fn set_state(&self, state: RefreshState) {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        status.state = state;
    }

    /// Copy of the refresh bookkeeping.
    pub fn status(&self) -> RefreshStatus {
        self.status.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}
