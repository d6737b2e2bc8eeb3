//! The kernel's per-object bookkeeping record

use std::collections::BTreeSet;
use std::sync::{Arc, Weak};

use objstore_wire::{InstanceId, ObjectRef, ObjectStoreError};

use crate::finalization::FinalizationQueue;
use crate::interfaces::merge_declared_interfaces;
use crate::managed::Managed;
use crate::proxy::Proxy;
use crate::resolve::TypeResolver;

/// Per-object kernel record: FQN, interfaces, weak reference to the proxy,
/// and instance id.
///
/// Holds a *strong* reference to the real referent independently of the
/// proxy (invariant 3) — the handle, not the proxy, is what keeps the
/// referent alive; the proxy merely transitively shares that liveness while
/// it exists (invariant 4).
#[derive(Debug)]
pub struct Handle {
    instance_id: InstanceId,
    class_fqn: String,
    declared_interfaces: BTreeSet<String>,
    provided_interfaces: BTreeSet<String>,
    referent: Arc<dyn Managed>,
    proxy: Weak<Proxy>,
    finalization: FinalizationQueue,
}

/// Whether [`Handle::proxy`] returned an existing live proxy or minted a
/// fresh one (the latter fires the `retained` lifecycle event).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyOutcome {
    /// The previous proxy was still alive.
    Live,
    /// A new proxy was minted (the handle was dormant, or this is the
    /// first proxy ever minted for it).
    Minted,
}

impl Handle {
    pub(crate) fn new(
        instance_id: InstanceId,
        class_fqn: String,
        declared_interfaces: BTreeSet<String>,
        provided_interfaces: BTreeSet<String>,
        referent: Arc<dyn Managed>,
        finalization: FinalizationQueue,
    ) -> Self {
        Handle {
            instance_id,
            class_fqn,
            declared_interfaces,
            provided_interfaces,
            referent,
            proxy: Weak::new(),
            finalization,
        }
    }

    /// The immutable instance id.
    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    /// The most-specific concrete class FQN known.
    pub fn class_fqn(&self) -> &str {
        &self.class_fqn
    }

    /// The minimised `declaredInterfaces`, lexicographically sorted.
    pub fn interfaces(&self) -> Vec<String> {
        self.declared_interfaces.iter().cloned().collect()
    }

    /// The real referent this handle keeps alive.
    pub fn referent(&self) -> &Arc<dyn Managed> {
        &self.referent
    }

    /// True iff the weak proxy reference still resolves.
    pub fn has_proxy(&self) -> bool {
        self.proxy.strong_count() > 0
    }

    /// Return the live proxy if one exists; otherwise mint a new one.
    ///
    /// Minting always unmarks `instance_id` from the finalization queue —
    /// reanimation — since a live proxy is by definition not
    /// finalized.
    pub fn proxy(&mut self) -> (Arc<Proxy>, ProxyOutcome) {
        if let Some(existing) = self.proxy.upgrade() {
            return (existing, ProxyOutcome::Live);
        }
        let fresh = Proxy::new(self.referent.clone(), self.instance_id.clone(), self.finalization.clone());
        self.proxy = Arc::downgrade(&fresh);
        self.finalization.unmark(&self.instance_id);
        (fresh, ProxyOutcome::Minted)
    }

    /// Extend `providedInterfaces` with the closure of each new FQN, add the
    /// raw FQNs to `declaredInterfaces`, then re-minimise `declaredInterfaces`
    /// against `providedInterfaces`.
    pub fn merge_interfaces<R: TypeResolver>(
        &mut self,
        resolver: &R,
        more_fqns: impl IntoIterator<Item = String>,
    ) -> Result<(), ObjectStoreError> {
        merge_declared_interfaces(resolver, &mut self.provided_interfaces, &mut self.declared_interfaces, more_fqns)
    }

    /// Produce the wire reference for this handle.
    pub fn object_reference(&self) -> ObjectRef {
        ObjectRef::new(self.instance_id.clone(), &self.declared_interfaces)
    }
}
