//! The pending-`del`-request queue
//!
//! Host-side counterpart to `objstore_kernel`'s `FinalizationQueue`: instead
//! of recording "this proxy died" for later inspection by the owning store,
//! it records "this instance id is now eligible for a `del` request", which
//! the host session loop drains once per tick and turns into outbound wire
//! frames.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use objstore_wire::InstanceId;

#[derive(Debug, Default)]
struct Inner {
    pending: Mutex<HashSet<InstanceId>>,
}

/// A cloneable handle onto the set of instance ids awaiting a `del` request.
#[derive(Debug, Clone, Default)]
pub struct DeleteQueue(Arc<Inner>);

impl DeleteQueue {
    /// A fresh, empty queue.
    pub fn new() -> Self {
        DeleteQueue::default()
    }

    /// Record that `id` is now eligible for a `del` request.
    pub fn mark_pending(&self, id: InstanceId) {
        self.0.pending.lock().unwrap().insert(id);
    }

    /// A `release` notification reanimated `id` (the host handed the proxy
    /// back out before the loop got to drain it) — it must not surface in
    /// the next `del` batch.
    pub fn unmark(&self, id: &InstanceId) {
        self.0.pending.lock().unwrap().remove(id);
    }

    /// Drain and return everything pending since the last drain.
    pub fn drain(&self) -> Vec<InstanceId> {
        let mut guard = self.0.pending.lock().unwrap();
        guard.drain().collect()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &InstanceId) -> bool {
        self.0.pending.lock().unwrap().contains(id)
    }
}
