//! The kernel-side object store

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use objstore_wire::{InstanceId, ObjectRef, ObjectStoreError};

use crate::config::StoreConfig;
use crate::finalization::FinalizationQueue;
use crate::handle::{Handle, ProxyOutcome};
use crate::interfaces::{interface_closure, merge_declared_interfaces};
use crate::listener::{self, StoreListener};
use crate::managed::Managed;
use crate::proxy::Proxy;
use crate::resolve::TypeResolver;
use crate::sequence::InstanceIdSequence;

/// Identity key for `byInstance`: the address of the referent's allocation.
///
/// `Arc<dyn Managed>` is a fat pointer (data + vtable); narrowing it to
/// `*const ()` drops the vtable, leaving exactly the data address, which is
/// what "the same real referent" means here. The handle itself already
/// holds the strong `Arc`, so this key never needs to be weak: its entry is
/// removed in lock-step with the handle (see `delete`).
type InstanceKey = usize;

fn instance_key(referent: &Arc<dyn Managed>) -> InstanceKey {
    Arc::as_ptr(referent) as *const () as usize
}

/// `realObject(x)`: recognise `x` as a previously-minted [`Proxy`] handed
/// back in as an argument and return its hidden referent slot instead of
/// keying on the proxy's own identity (§4.5 "Restoring identity across the
/// wire"). A `Proxy` satisfies the blanket [`Managed`] impl like any other
/// `'static + Send + Sync` type, so without this step `register`/`ref_object`
/// would key on the proxy's address and mint a spurious second handle for an
/// object that is already managed.
fn real_object(instance: &Arc<dyn Managed>) -> Arc<dyn Managed> {
    instance.downcast_ref::<Proxy>().map(Proxy::real_object).cloned().unwrap_or_else(|| instance.clone())
}

/// The authoritative registry of managed objects inside the kernel process.
///
/// State: `handles` (instanceId -> Handle), `by_instance` (referent identity
/// -> instanceId), a [`FinalizationQueue`], and a set of lifecycle
/// listeners. Not `Sync`-shared across an event loop by design — the
/// scheduling model is single-threaded cooperative, so `ObjectStore` is
/// owned outright by the session loop rather than wrapped in
/// `Arc<Mutex<_>>`.
#[derive(Debug)]
pub struct ObjectStore {
    handles: HashMap<InstanceId, Handle>,
    by_instance: HashMap<InstanceKey, InstanceId>,
    sequence: InstanceIdSequence,
    finalization: FinalizationQueue,
    listeners: Vec<Arc<dyn StoreListener>>,
    type_registry: HashMap<std::any::TypeId, String>,
    debug: bool,
}

impl ObjectStore {
    /// A new, empty store. Stores are per-kernel-instance (never
    /// process-global) — independent tests may construct as many as they like.
    pub fn new(config: StoreConfig) -> Self {
        ObjectStore {
            handles: HashMap::new(),
            by_instance: HashMap::new(),
            sequence: config.sequence.into(),
            finalization: FinalizationQueue::new(),
            listeners: Vec::new(),
            type_registry: HashMap::new(),
            debug: config.debug,
        }
    }

    /// Subscribe to lifecycle events.
    pub fn add_listener(&mut self, listener: Arc<dyn StoreListener>) {
        self.listeners.push(listener);
    }

    fn emit(&self, event_name: &'static str, id: &InstanceId, call: impl FnMut(&dyn StoreListener, &InstanceId)) {
        listener::dispatch(&self.listeners, event_name, id, call);
    }

    /// Register a real referent as a managed object, or merge interfaces
    /// into its existing handle if it is already managed.
    ///
    /// Always returns a **live** proxy, so `has_proxy` is guaranteed true on
    /// the returned handle immediately after this call.
    pub fn register<R: TypeResolver>(
        &mut self,
        resolver: &R,
        class_fqn: &str,
        instance: Option<Arc<dyn Managed>>,
        declared_interface_fqns: impl IntoIterator<Item = String>,
    ) -> Result<(Arc<Proxy>, ObjectRef), ObjectStoreError> {
        let referent = instance.ok_or(ObjectStoreError::NullArgument)?;
        let referent = real_object(&referent);
        let key = instance_key(&referent);

        if let Some(existing_id) = self.by_instance.get(&key).cloned() {
            let handle = self.handles.get_mut(&existing_id).expect("by_instance entries always have a handle");
            handle.merge_interfaces(resolver, declared_interface_fqns)?;
            let (proxy, outcome) = handle.proxy();
            let object_ref = handle.object_reference();
            if self.debug {
                log::debug!("register: merged interfaces into existing {existing_id}");
            }
            if outcome == ProxyOutcome::Minted {
                self.emit("retained", &existing_id, |l, id| l.retained(id));
            }
            return Ok((proxy, object_ref));
        }

        let mut provided = interface_closure(resolver, class_fqn)?;
        let mut declared = BTreeSet::new();
        merge_declared_interfaces(resolver, &mut provided, &mut declared, declared_interface_fqns)?;

        let sequence = self.sequence.next_value();
        let instance_id = InstanceId::new(class_fqn.to_string(), sequence);

        let mut handle = Handle::new(
            instance_id.clone(),
            class_fqn.to_string(),
            declared,
            provided,
            referent,
            self.finalization.clone(),
        );
        let (proxy, _) = handle.proxy();
        let object_ref = handle.object_reference();

        self.handles.insert(instance_id.clone(), handle);
        self.by_instance.insert(key, instance_id.clone());

        if self.debug {
            log::debug!("register: managed new instance {instance_id}");
        }
        self.emit("managed", &instance_id, |l, id| l.managed(id));

        Ok((proxy, object_ref))
    }

    /// Look up a handle by wire reference, reanimating it to `proxy-live`
    /// and returning its live proxy plus its class FQN and interfaces.
    pub fn dereference(
        &mut self,
        object_ref: &ObjectRef,
    ) -> Result<(String, Arc<Proxy>, Vec<String>), ObjectStoreError> {
        let id = object_ref.instance_id.clone();
        let handle = self
            .handles
            .get_mut(&id)
            .ok_or_else(|| ObjectStoreError::UnknownReference(id.clone()))?;
        let (proxy, outcome) = handle.proxy();
        let class_fqn = handle.class_fqn().to_string();
        let interfaces = handle.interfaces();
        if outcome == ProxyOutcome::Minted {
            self.emit("retained", &id, |l, id| l.retained(id));
        }
        Ok((class_fqn, proxy, interfaces))
    }

    /// If `instance` is already managed, return its wire reference.
    pub fn ref_object(&self, instance: &Arc<dyn Managed>) -> Option<ObjectRef> {
        let key = instance_key(&real_object(instance));
        let id = self.by_instance.get(&key)?;
        self.handles.get(id).map(Handle::object_reference)
    }

    /// Attach an FQN marker to a constructor type, recoverable later via
    /// [`ObjectStore::type_fqn`].
    ///
    /// Rust rendition of the host's non-enumerable constructor property:
    /// keyed by `TypeId` rather than by the constructor object itself, and
    /// scoped to this store rather than process-global (see `DESIGN.md`).
    pub fn register_type<T: 'static>(&mut self, fqn: impl Into<String>) {
        self.type_registry.insert(std::any::TypeId::of::<T>(), fqn.into());
    }

    /// Recover the most-specific FQN registered for `T`, if any.
    pub fn type_fqn<T: 'static>(&self) -> Option<&str> {
        self.type_registry.get(&std::any::TypeId::of::<T>()).map(String::as_str)
    }

    /// Remove a handle from the store.
    ///
    /// Precondition: the handle must have no live proxy. Violating it is a
    /// programmer error that fails with `StillReachable` rather than a
    /// silent no-op.
    pub fn delete(&mut self, object_ref: &ObjectRef) -> Result<(), ObjectStoreError> {
        let id = &object_ref.instance_id;
        let handle = self
            .handles
            .get(id)
            .ok_or_else(|| ObjectStoreError::UnknownReference(id.clone()))?;
        if handle.has_proxy() {
            return Err(ObjectStoreError::StillReachable(id.clone()));
        }
        let key = instance_key(handle.referent());
        self.handles.remove(id);
        self.by_instance.remove(&key);
        if self.debug {
            log::debug!("delete: unmanaged {id}");
        }
        self.emit("unmanaged", id, |l, id| l.unmanaged(id));
        Ok(())
    }

    /// Drain and return the instance ids whose proxy has been observed
    /// finalized, clearing the queue.
    ///
    /// Called once per event-loop tick, immediately before writing a
    /// response — the result becomes the payload of a `release`
    /// notification.
    pub fn finalized_instance_ids(&mut self) -> Vec<InstanceId> {
        let ids = self.finalization.drain();
        for id in &ids {
            self.emit("releasable", id, |l, id| l.releasable(id));
        }
        ids
    }

    /// Number of handles currently tracked (mostly useful to tests).
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if no handles are tracked.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::resolve::{StaticTypeResolver, TypeDescriptor};

    struct Widget;
    struct Gadget;

    fn resolver() -> StaticTypeResolver {
        let mut r = StaticTypeResolver::new();
        r.define("Acme.IA", TypeDescriptor::interface());
        r.define("Acme.IB", TypeDescriptor::interface().with_interfaces(["Acme.IA"]));
        r.define("Acme.Widget", TypeDescriptor::class());
        r
    }

    #[test]
    fn unique_and_monotonic_ids_across_many_registrations() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let mut ids = Vec::new();
        for _ in 0..50 {
            let (_proxy, obj_ref) =
                store.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();
            ids.push(obj_ref.instance_id.sequence());
        }
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted, "ids must be returned in monotonic order");
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn registering_the_same_referent_twice_is_idempotent() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let widget: Arc<dyn Managed> = Arc::new(Widget);
        let (_p1, ref1) =
            store.register(&r, "Acme.Widget", Some(widget.clone()), ["Acme.IA".to_string()]).unwrap();
        let (_p2, ref2) = store
            .register(&r, "Acme.Widget", Some(widget.clone()), ["Acme.IB".to_string()])
            .unwrap();
        assert_eq!(ref1.instance_id, ref2.instance_id);
        assert_eq!(ref2.interfaces, Some(vec!["Acme.IB".to_string()]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn register_rejects_null_instance() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let err = store.register(&r, "Acme.Widget", None, []).unwrap_err();
        assert_eq!(err.kind_name(), "NullArgument");
    }

    #[test]
    fn dereference_unknown_reference_fails() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let bogus = ObjectRef::new(InstanceId::new("Acme.Widget", 99999), &BTreeSet::new());
        let err = store.dereference(&bogus).unwrap_err();
        assert_eq!(err.kind_name(), "UnknownReference");
    }

    #[test]
    fn delete_precondition_and_effects() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let (proxy, obj_ref) =
            store.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();

        // Still reachable: the proxy returned by register is alive.
        let err = store.delete(&obj_ref).unwrap_err();
        assert_eq!(err.kind_name(), "StillReachable");

        drop(proxy);
        store.finalized_instance_ids(); // drain, as the session loop would

        store.delete(&obj_ref).unwrap();
        assert!(store.is_empty());

        let err = store.delete(&obj_ref).unwrap_err();
        assert_eq!(err.kind_name(), "UnknownReference");
    }

    #[test]
    fn finalization_round_trip_scenario_one() {
        // Scenario 1: create-use-release.
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let (proxy, obj_ref) =
            store.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();
        assert_eq!(obj_ref.instance_id, InstanceId::new("Acme.Widget", 10000));

        drop(proxy);
        let finalized = store.finalized_instance_ids();
        assert_eq!(finalized, vec![obj_ref.instance_id.clone()]);

        store.delete(&obj_ref).unwrap();
        let err = store.delete(&obj_ref).unwrap_err();
        assert_eq!(err.kind_name(), "UnknownReference");
    }

    #[test]
    fn reanimation_flushes_finalized_scenario_three() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let (proxy, obj_ref) =
            store.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();
        drop(proxy);

        // Before dereference runs, the id is sitting in the finalization queue.
        let (_class, new_proxy, _ifaces) = store.dereference(&obj_ref).unwrap();

        // Reanimated: must not show up in the next release batch.
        let finalized = store.finalized_instance_ids();
        assert!(finalized.is_empty());

        // Still reachable via the freshly minted proxy.
        let err = store.delete(&obj_ref).unwrap_err();
        assert_eq!(err.kind_name(), "StillReachable");
        drop(new_proxy);
    }

    #[test]
    fn ref_object_finds_already_managed_instances() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let widget: Arc<dyn Managed> = Arc::new(Widget);
        let (_p, obj_ref) = store.register(&r, "Acme.Widget", Some(widget.clone()), []).unwrap();
        assert_eq!(store.ref_object(&widget), Some(obj_ref));

        let other: Arc<dyn Managed> = Arc::new(Gadget);
        assert_eq!(store.ref_object(&other), None);
    }

    #[test]
    fn type_registry_round_trips() {
        let mut store = ObjectStore::new(StoreConfig::default());
        store.register_type::<Widget>("Acme.Widget");
        assert_eq!(store.type_fqn::<Widget>(), Some("Acme.Widget"));
        assert_eq!(store.type_fqn::<Gadget>(), None);
    }

    #[test]
    fn register_with_multiple_declared_interfaces_minimises_within_one_call() {
        // IB extends IA; declaring both together on a *brand-new* instance
        // must minimise away IA immediately, not just on a later merge.
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let (_proxy, obj_ref) = store
            .register(
                &r,
                "Acme.Widget",
                Some(Arc::new(Widget) as Arc<dyn Managed>),
                ["Acme.IB".to_string(), "Acme.IA".to_string()],
            )
            .unwrap();
        assert_eq!(obj_ref.interfaces, Some(vec!["Acme.IB".to_string()]));
    }

    #[test]
    fn registering_a_proxy_recognises_the_object_it_already_wraps() {
        let mut store = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        let (proxy, obj_ref) =
            store.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();

        // Hand the live proxy itself back in as if it were a fresh instance:
        // `realObject` must recover the underlying referent so this merges
        // into the existing handle instead of minting a spurious second one.
        let proxy_as_managed = proxy.clone() as Arc<dyn Managed>;
        let (_p2, obj_ref2) = store
            .register(&r, "Acme.Widget", Some(proxy_as_managed.clone()), ["Acme.IA".to_string()])
            .unwrap();

        assert_eq!(obj_ref.instance_id, obj_ref2.instance_id);
        assert_eq!(store.len(), 1);
        assert_eq!(store.ref_object(&proxy_as_managed), Some(obj_ref2));
    }

    #[test]
    fn independent_stores_do_not_share_state() {
        let mut a = ObjectStore::new(StoreConfig::default());
        let b = ObjectStore::new(StoreConfig::default());
        let r = resolver();
        a.register(&r, "Acme.Widget", Some(Arc::new(Widget) as Arc<dyn Managed>), []).unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 0);
    }
}
