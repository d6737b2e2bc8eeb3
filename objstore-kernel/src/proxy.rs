//! The user-facing proxy wrapper
//!
//! A transparent forwarder over the real referent, weakly observed by the
//! owning [`crate::handle::Handle`]. `Deref` makes member access on the
//! proxy indistinguishable from access on the referent;
//! [`Proxy::real_object`] is the hidden, non-enumerable-in-spirit slot used
//! to defeat identity loss when a proxy is handed back in as an argument —
//! in Rust there is no property system to hide it from, so it is simply a
//! plain accessor.

use std::ops::Deref;
use std::sync::Arc;

use objstore_wire::InstanceId;

use crate::finalization::FinalizationQueue;
use crate::managed::Managed;

/// A live, user-visible reference to a managed object.
///
/// Dropping the last `Proxy` for a given handle is this crate's rendition
/// of "the runtime's finalization facility observed the proxy die": it
/// pushes `instance_id` onto the owning store's [`FinalizationQueue`].
#[derive(Debug)]
pub struct Proxy {
    referent: Arc<dyn Managed>,
    instance_id: InstanceId,
    finalization: FinalizationQueue,
}

impl Proxy {
    pub(crate) fn new(
        referent: Arc<dyn Managed>,
        instance_id: InstanceId,
        finalization: FinalizationQueue,
    ) -> Arc<Self> {
        Arc::new(Proxy { referent, instance_id, finalization })
    }

    /// The instance id of the handle that owns this proxy.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// The hidden slot exposing the real referent, used by the store to
    /// recognise a proxy handed back in as an argument (`realObject()`).
    pub fn real_object(&self) -> &Arc<dyn Managed> {
        &self.referent
    }

    /// Downcast the real referent to a concrete type.
    pub fn downcast<T: Managed>(&self) -> Option<&T> {
        self.referent.as_any().downcast_ref::<T>()
    }
}

impl Deref for Proxy {
    type Target = dyn Managed;

    fn deref(&self) -> &Self::Target {
        &*self.referent
    }
}

impl Drop for Proxy {
    fn drop(&mut self) {
        log::trace!("proxy for {} finalized", self.instance_id);
        self.finalization.mark_finalized(self.instance_id.clone());
    }
}
