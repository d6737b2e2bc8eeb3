//! The host reference table

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use objstore_wire::{InstanceId, ObjectRef};

use crate::delete_queue::DeleteQueue;
use crate::proxy::HostProxy;

/// Per-object host-side bookkeeping: mirrors the kernel's instance id and
/// declared interfaces, plus a weak proxy reference and, only for objects
/// the host itself created, a strong reference held until the kernel
/// reports the instance as releasable.
#[derive(Debug)]
struct Record {
    declared_interfaces: Vec<String>,
    proxy: Weak<HostProxy>,
    /// `Some` only while this record is in the `both-reachable` state for a
    /// host-created object.
    strong: Option<Arc<HostProxy>>,
}

/// The host-side mirror of the kernel's object store.
///
/// Owned outright by whatever drives the host's request/notification loop
/// (`session::HostSession`), the same single-owner discipline
/// `objstore_kernel::ObjectStore` follows on the other side of the wire.
#[derive(Debug, Default)]
pub struct ReferenceTable {
    records: HashMap<InstanceId, Record>,
    pending_delete: DeleteQueue,
}

impl ReferenceTable {
    /// An empty table.
    pub fn new() -> Self {
        ReferenceTable { records: HashMap::new(), pending_delete: DeleteQueue::new() }
    }

    /// Obtain a live proxy for `object_ref`, reanimating a dormant record or
    /// creating a fresh one as needed.
    ///
    /// `host_created` marks objects returned directly from a `create`
    /// request — only those ever hold a strong reference in this table.
    pub fn track(&mut self, object_ref: &ObjectRef, host_created: bool) -> Arc<HostProxy> {
        let id = object_ref.instance_id.clone();

        if let Some(record) = self.records.get_mut(&id) {
            if let Some(existing) = record.proxy.upgrade() {
                if host_created && record.strong.is_none() {
                    record.strong = Some(existing.clone());
                }
                return existing;
            }
            // Dormant: the previous proxy was collected. Reanimate.
            self.pending_delete.unmark(&id);
            let fresh = Arc::new(HostProxy::new(id.clone(), self.pending_delete.clone()));
            record.proxy = Arc::downgrade(&fresh);
            record.strong = if host_created { Some(fresh.clone()) } else { None };
            return fresh;
        }

        let declared_interfaces = object_ref.interfaces.clone().unwrap_or_default();
        let fresh = Arc::new(HostProxy::new(id.clone(), self.pending_delete.clone()));
        let strong = if host_created { Some(fresh.clone()) } else { None };
        self.records.insert(id, Record { declared_interfaces, proxy: Arc::downgrade(&fresh), strong });
        fresh
    }

    /// The declared interfaces recorded for a tracked instance, if any.
    pub fn declared_interfaces(&self, id: &InstanceId) -> Option<&[String]> {
        self.records.get(id).map(|r| r.declared_interfaces.as_slice())
    }

    /// Apply a kernel `release` notification: clear the strong reference for
    /// every listed instance id that this table still tracks.
    ///
    /// If nothing else is holding the proxy, dropping this table's own
    /// strong clone fires `HostProxy::drop` synchronously and the id lands
    /// in the pending-delete queue within this call.
    pub fn on_release(&mut self, released: &[InstanceId]) {
        for id in released {
            if let Some(record) = self.records.get_mut(id) {
                record.strong = None;
            }
        }
    }

    /// Drain the instance ids whose proxy has been collected and that are
    /// now eligible for a `del` request.
    pub fn drain_pending_deletes(&mut self) -> Vec<InstanceId> {
        self.pending_delete.drain()
    }

    /// Remove a record entirely, e.g. once the host has sent its `del`
    /// request and moved on. Kernel confirmation is not required to forget
    /// host-side bookkeeping — the kernel is the source of truth for
    /// whether the instance still exists.
    pub fn forget(&mut self, id: &InstanceId) {
        self.records.remove(id);
    }

    /// Number of instances currently tracked (mostly useful to tests).
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no instances are tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeSet;

    fn obj_ref(n: u64) -> ObjectRef {
        ObjectRef::new(InstanceId::new("Acme.Widget", n), &BTreeSet::new())
    }

    #[test]
    fn tracking_the_same_reference_twice_returns_the_same_proxy() {
        let mut table = ReferenceTable::new();
        let r = obj_ref(1);
        let p1 = table.track(&r, false);
        let p2 = table.track(&r, false);
        assert!(Arc::ptr_eq(&p1, &p2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn host_created_objects_hold_a_strong_reference_until_release() {
        let mut table = ReferenceTable::new();
        let r = obj_ref(1);
        let proxy = table.track(&r, true);
        let weak = Arc::downgrade(&proxy);
        drop(proxy);
        // The table's own strong clone keeps it alive even though the
        // caller's handle was dropped.
        assert!(weak.upgrade().is_some());
        assert!(table.drain_pending_deletes().is_empty());

        table.on_release(&[r.instance_id.clone()]);
        assert!(weak.upgrade().is_none());
        assert_eq!(table.drain_pending_deletes(), vec![r.instance_id]);
    }

    #[test]
    fn kernel_origin_objects_never_get_a_strong_reference() {
        let mut table = ReferenceTable::new();
        let r = obj_ref(1);
        let proxy = table.track(&r, false);
        let weak = Arc::downgrade(&proxy);
        drop(proxy);
        assert!(weak.upgrade().is_none());
        assert_eq!(table.drain_pending_deletes(), vec![r.instance_id]);
    }

    #[test]
    fn reanimation_clears_a_pending_delete() {
        let mut table = ReferenceTable::new();
        let r = obj_ref(1);
        let proxy = table.track(&r, false);
        drop(proxy);

        // Re-obtain before the del is actually sent: must come back clean.
        let proxy = table.track(&r, false);
        assert!(table.drain_pending_deletes().is_empty());
        drop(proxy);
    }

    #[test]
    fn forget_removes_the_record() {
        let mut table = ReferenceTable::new();
        let r = obj_ref(1);
        table.track(&r, false);
        table.forget(&r.instance_id);
        assert!(table.is_empty());
    }
}
