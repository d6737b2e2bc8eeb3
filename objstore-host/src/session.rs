//! The host-side loop driving the reference table against the wire

use objstore_wire::{DelRequest, DelResponse, InstanceId, ObjectRef, ReleaseNotification};

use crate::table::ReferenceTable;

/// The transport abstraction a [`HostSession`] drives.
///
/// The host initiates `del` requests and observes `release` notifications
/// piggybacked on whatever response stream the surrounding RPC protocol
/// uses; this crate models only that narrow slice, not the rest of the
/// request/response envelope.
pub trait HostTransport {
    /// Send a `del` request and block for its response.
    fn send_del(&mut self, request: DelRequest) -> DelResponse;
}

/// Drives a [`ReferenceTable`] against a [`HostTransport`].
#[derive(Debug, Default)]
pub struct HostSession {
    table: ReferenceTable,
}

impl HostSession {
    /// A session over a fresh, empty table.
    pub fn new() -> Self {
        HostSession { table: ReferenceTable::default() }
    }

    /// Obtain a live proxy for a reference the host just received (from a
    /// `create` response, a method's return value, or an argument callback).
    pub fn track(&mut self, object_ref: &ObjectRef, host_created: bool) -> std::sync::Arc<crate::proxy::HostProxy> {
        self.table.track(object_ref, host_created)
    }

    /// Apply a `release` notification piggybacked on an incoming response.
    ///
    /// Must be called before any other handling of the response it was
    /// piggybacked on, mirroring the kernel's emit-before-respond ordering
    /// rule from the other side of the wire.
    pub fn apply_release(&mut self, notification: &ReleaseNotification) {
        self.table.on_release(&notification.release);
    }

    /// Drain every instance id whose host proxy has been collected and is
    /// now eligible for a `del` request, sending one request per id through
    /// `transport`.
    ///
    /// Returns the ids for which the kernel reported anything other than
    /// success, so the caller can decide how to surface the failure (the
    /// host table itself does not retry).
    pub fn flush_deletes<T: HostTransport>(&mut self, transport: &mut T) -> Vec<(InstanceId, DelResponse)> {
        let mut failures = Vec::new();
        for id in self.table.drain_pending_deletes() {
            let request = DelRequest::new(id.clone());
            let response = transport.send_del(request);
            match &response {
                DelResponse::Ok { .. } => self.table.forget(&id),
                DelResponse::Err { .. } => failures.push((id, response)),
            }
        }
        failures
    }

    /// Number of instances currently tracked (mostly useful to tests).
    pub fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeSet;

    struct RecordingTransport {
        sent: Vec<DelRequest>,
        scripted: std::collections::VecDeque<DelResponse>,
    }

    impl HostTransport for RecordingTransport {
        fn send_del(&mut self, request: DelRequest) -> DelResponse {
            self.sent.push(request);
            self.scripted.pop_front().unwrap_or_else(DelResponse::ok)
        }
    }

    fn obj_ref(n: u64) -> ObjectRef {
        ObjectRef::new(InstanceId::new("Acme.Widget", n), &BTreeSet::new())
    }

    #[test]
    fn a_collected_kernel_origin_proxy_produces_a_del_request() {
        let mut session = HostSession::new();
        let r = obj_ref(1);
        let proxy = session.track(&r, false);
        drop(proxy);

        let mut transport = RecordingTransport { sent: Vec::new(), scripted: Default::default() };
        let failures = session.flush_deletes(&mut transport);
        assert!(failures.is_empty());
        assert_eq!(transport.sent, vec![DelRequest::new(r.instance_id)]);
        assert_eq!(session.len(), 0);
    }

    #[test]
    fn release_then_drop_produces_a_del_request_for_a_host_created_object() {
        let mut session = HostSession::new();
        let r = obj_ref(1);
        let proxy = session.track(&r, true);

        let mut transport = RecordingTransport { sent: Vec::new(), scripted: Default::default() };
        assert!(session.flush_deletes(&mut transport).is_empty());

        session.apply_release(&ReleaseNotification { release: vec![r.instance_id.clone()] });
        drop(proxy);

        let failures = session.flush_deletes(&mut transport);
        assert!(failures.is_empty());
        assert_eq!(transport.sent, vec![DelRequest::new(r.instance_id)]);
    }

    #[test]
    fn a_still_reachable_failure_keeps_the_record_for_a_future_retry() {
        let mut session = HostSession::new();
        let r = obj_ref(1);
        let proxy = session.track(&r, false);
        drop(proxy);

        let mut transport = RecordingTransport {
            sent: Vec::new(),
            scripted: std::collections::VecDeque::from(vec![DelResponse::Err {
                error: "StillReachable".to_string(),
                message: "still reachable".to_string(),
            }]),
        };
        let failures = session.flush_deletes(&mut transport);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, r.instance_id);
    }
}
