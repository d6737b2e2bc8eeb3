//! The finalized-instance-id queue
//!
//! Stands in for the runtime's finalization registry. A real
//! `FinalizationRegistry` callback can fire on a GC housekeeping thread at
//! an indeterminate time relative to the event loop; this crate's `Proxy`
//! plays that role via `Drop`, which is deterministic but may still run on
//! a different thread than the one draining the queue (for instance, if a
//! `Proxy` is sent to another thread and dropped there). A `Mutex` makes the
//! insert-versus-drain race impossible rather than merely unlikely.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use objstore_wire::InstanceId;

#[derive(Debug, Default)]
struct Inner {
    finalized: Mutex<HashSet<InstanceId>>,
}

/// A cloneable handle onto the store's set of finalized-but-not-yet-drained
/// instance ids.
#[derive(Debug, Clone, Default)]
pub struct FinalizationQueue(Arc<Inner>);

impl FinalizationQueue {
    /// A fresh, empty queue.
    pub fn new() -> Self {
        FinalizationQueue::default()
    }

    /// Record that `id`'s proxy has been observed dropped.
    ///
    /// Called from `Proxy::drop`. Invariant 5: an id only ever appears here
    /// because its weak proxy reference was observed dead.
    pub fn mark_finalized(&self, id: InstanceId) {
        self.0.finalized.lock().unwrap().insert(id);
    }

    /// Reanimation: a fresh proxy was minted for `id`, so it must not
    /// appear in the next `release` batch even if it was marked finalized
    /// earlier in the same tick.
    pub fn unmark(&self, id: &InstanceId) {
        self.0.finalized.lock().unwrap().remove(id);
    }

    /// Drain and return everything finalized since the last drain.
    pub fn drain(&self) -> Vec<InstanceId> {
        let mut guard = self.0.finalized.lock().unwrap();
        guard.drain().collect()
    }

    /// True if `id` is currently queued as finalized (used by tests and by
    /// `Handle::has_proxy`-adjacent bookkeeping).
    #[cfg(test)]
    pub fn contains(&self, id: &InstanceId) -> bool {
        self.0.finalized.lock().unwrap().contains(id)
    }
}
