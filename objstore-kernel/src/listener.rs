//! Lifecycle event listeners
//!
//! An `Arc<dyn StoreListener>` invoked by reference rather than a
//! stringly-typed event-name dispatcher. Default no-op method bodies let a
//! listener implement only the events it cares about.

use std::panic::{catch_unwind, AssertUnwindSafe};

use objstore_wire::InstanceId;

/// Observes `managed`/`retained`/`releasable`/`unmanaged` lifecycle events
/// emitted by [`crate::store::ObjectStore`].
///
/// Listener exceptions must never propagate out of the store: a panicking
/// listener is caught and logged, not allowed to unwind into the caller of
/// `register`/`delete`/etc.
pub trait StoreListener: Send + Sync {
    /// A new handle was created by `register`.
    fn managed(&self, _id: &InstanceId) {}
    /// A dormant handle gained a proxy again.
    fn retained(&self, _id: &InstanceId) {}
    /// The finalization callback fired for a handle's proxy.
    fn releasable(&self, _id: &InstanceId) {}
    /// `delete` removed a handle from the store.
    fn unmanaged(&self, _id: &InstanceId) {}
}

pub(crate) fn dispatch(
    listeners: &[std::sync::Arc<dyn StoreListener>],
    event_name: &'static str,
    id: &InstanceId,
    mut call: impl FnMut(&dyn StoreListener, &InstanceId),
) {
    for listener in listeners {
        let result = catch_unwind(AssertUnwindSafe(|| call(listener.as_ref(), id)));
        if result.is_err() {
            log::error!("listener panicked while handling `{event_name}` for {id}");
        }
    }
}
