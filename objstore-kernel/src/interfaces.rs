//! Interface closure computation and declared-interface minimisation

use std::collections::{BTreeSet, VecDeque};

use objstore_wire::ObjectStoreError;

use crate::resolve::{TypeKind, TypeResolver};

/// Compute the transitive set of interfaces granted by a class FQN.
///
/// 1. Seeded with a class FQN: walks the class base chain, collecting every
///    `interfaces` entry at each level.
/// 2. For each added interface, recursively adds its parent interfaces.
/// 3. Deduplicates: an interface already in the set is not re-walked.
///
/// Fails with [`ObjectStoreError::InvalidType`] if `class_fqn` does not
/// resolve to a class, or if a name reached while walking interfaces does
/// not resolve to an interface.
pub fn interface_closure<R: TypeResolver>(
    resolver: &R,
    class_fqn: &str,
) -> Result<BTreeSet<String>, ObjectStoreError> {
    let mut provided = BTreeSet::new();
    let mut pending_interfaces: VecDeque<String> = VecDeque::new();

    let mut current_class = Some(class_fqn.to_string());
    while let Some(fqn) = current_class.take() {
        let descriptor = resolver.resolve_type(&fqn)?;
        if descriptor.kind != TypeKind::Class {
            return Err(ObjectStoreError::InvalidType { fqn, expected: "class" });
        }
        pending_interfaces.extend(descriptor.interfaces);
        current_class = descriptor.base;
    }

    while let Some(fqn) = pending_interfaces.pop_front() {
        if provided.contains(&fqn) {
            continue;
        }
        let descriptor = resolver.resolve_type(&fqn)?;
        if descriptor.kind != TypeKind::Interface {
            return Err(ObjectStoreError::InvalidType { fqn, expected: "interface" });
        }
        pending_interfaces.extend(descriptor.interfaces.clone());
        provided.insert(fqn);
    }

    Ok(provided)
}

/// The closure of everything a single interface FQN *extends* (its parent
/// interfaces, transitively) — excluding the FQN itself.
///
/// Used by `mergeInterfaces` to fold a newly declared interface into
/// `providedInterfaces`: only what the interface implies should join
/// `providedInterfaces`, never the just-declared FQN itself, or minimisation
/// would immediately strip it back out of `declaredInterfaces`.
pub fn single_interface_closure<R: TypeResolver>(
    resolver: &R,
    interface_fqn: &str,
) -> Result<BTreeSet<String>, ObjectStoreError> {
    let seed = resolver.resolve_type(interface_fqn)?;
    if seed.kind != TypeKind::Interface {
        return Err(ObjectStoreError::InvalidType { fqn: interface_fqn.to_string(), expected: "interface" });
    }

    let mut provided = BTreeSet::new();
    let mut pending: VecDeque<String> = seed.interfaces.into_iter().collect();

    while let Some(fqn) = pending.pop_front() {
        if provided.contains(&fqn) {
            continue;
        }
        let descriptor = resolver.resolve_type(&fqn)?;
        if descriptor.kind != TypeKind::Interface {
            return Err(ObjectStoreError::InvalidType { fqn, expected: "interface" });
        }
        pending.extend(descriptor.interfaces.clone());
        provided.insert(fqn);
    }

    Ok(provided)
}

/// Drop from `declared` any interface already implied by `provided`, so that
/// `declared ∩ provided = ∅` (invariant 7).
pub fn minimise(declared: &mut BTreeSet<String>, provided: &BTreeSet<String>) {
    declared.retain(|iface| !provided.contains(iface));
}

/// Extend `provided` with the closure of each new FQN, add the raw FQNs to
/// `declared`, then re-minimise `declared` against `provided`.
///
/// Shared by [`crate::handle::Handle::merge_interfaces`] and the
/// first-registration path of `ObjectStore::register` so that declaring
/// `["IB", "IA"]` where `IB` extends `IA` minimises away the redundant `IA`
/// the same way whether the handle is brand new or already existed.
pub fn merge_declared_interfaces<R: TypeResolver>(
    resolver: &R,
    provided: &mut BTreeSet<String>,
    declared: &mut BTreeSet<String>,
    more_fqns: impl IntoIterator<Item = String>,
) -> Result<(), ObjectStoreError> {
    for fqn in more_fqns {
        let closure = single_interface_closure(resolver, &fqn)?;
        provided.extend(closure);
        declared.insert(fqn);
    }
    minimise(declared, provided);
    Ok(())
}
