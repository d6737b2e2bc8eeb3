//! The single-threaded cooperative event loop
//!
//! One thread owns the store outright and drives a simple
//! read-request / do-work / write-response loop, with no internal
//! concurrency to reason about. The one scheduling rule layered on top of a
//! plain request/response loop is ordering: any `release` notification
//! accumulated since the last tick must be written *before* the response to
//! the request that is about to complete.

use objstore_wire::{DelRequest, DelResponse, ReleaseNotification};

use crate::store::ObjectStore;

/// What the transport handed the session for this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelRequest {
    /// A `del` request from the host.
    Del(DelRequest),
    /// The host is shutting down the connection; no more requests follow.
    Exit,
}

/// What the session wants written back, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelResponse {
    /// Emitted first, if non-empty — see ordering rule above.
    pub release: Option<ReleaseNotification>,
    /// The response to the request that triggered this tick, if any
    /// (`Exit` produces no response).
    pub response: Option<DelResponse>,
}

/// The transport abstraction a [`Session`] drives.
///
/// This crate never opens a socket itself, it only specifies the shape of
/// the read/write calls a concrete transport (stdio-framed JSON lines, a
/// Unix socket, an in-process channel for tests) must provide.
pub trait KernelTransport {
    /// Block until the next request is available, or report the peer closed.
    fn recv_request(&mut self) -> Option<KernelRequest>;
    /// Write one response line. Called at most once per tick, and only
    /// after any `release` notification for the same tick has been written.
    fn send_response(&mut self, response: &KernelResponse);
}

/// Drives an [`ObjectStore`] against a [`KernelTransport`] until the peer
/// signals `Exit` or the transport reports no more requests.
#[derive(Debug)]
pub struct Session<T> {
    store: ObjectStore,
    transport: T,
}

impl<T: KernelTransport> Session<T> {
    /// Pair a store with a transport.
    pub fn new(store: ObjectStore, transport: T) -> Self {
        Session { store, transport }
    }

    /// Run one request/response tick. Returns `false` once the loop should
    /// stop (the peer exited or the transport ran dry).
    pub fn tick(&mut self) -> bool {
        let Some(request) = self.transport.recv_request() else {
            return false;
        };

        match request {
            KernelRequest::Exit => {
                let release = ReleaseNotification::non_empty(self.store.finalized_instance_ids());
                self.transport.send_response(&KernelResponse { release, response: None });
                false
            }
            KernelRequest::Del(del) => {
                let result = self.store.delete(&del.objref);
                // Release notifications for this tick are computed and sent
                // strictly before the del response: a host watching
                // for the release of instance X must never observe "X was
                // deleted" (which can only happen once X is unreachable)
                // arrive before "X was released".
                let release = ReleaseNotification::non_empty(self.store.finalized_instance_ids());
                let response = match result {
                    Ok(()) => DelResponse::ok(),
                    Err(err) => DelResponse::from(&err),
                };
                self.transport.send_response(&KernelResponse { release, response: Some(response) });
                true
            }
        }
    }

    /// Run until the transport is exhausted.
    pub fn run(&mut self) {
        while self.tick() {}
    }

    /// Access the underlying store, e.g. to register objects before the
    /// loop starts accepting requests.
    pub fn store_mut(&mut self) -> &mut ObjectStore {
        &mut self.store
    }
}
