//! The external type/assembly loader contract
//!
//! Resolving a fully-qualified name to its base class and declared
//! interfaces is the job of a collaborator this crate never implements (the
//! real loader lives in the host language's own module system). It is
//! modeled here as a trait purely so the interface-closure builder and
//! `register_type`/`type_fqn` can be exercised against an in-memory test
//! double instead of a real dynamic-language loader.

use objstore_wire::ObjectStoreError;

/// What kind of type a fully qualified name resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// A concrete or abstract class.
    Class,
    /// An interface.
    Interface,
    /// An enum (never behavioral; the store never manages enum instances).
    Enum,
}

/// The shape `resolveType(fqn)` is expected to return.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Whether this FQN names a class, interface, or enum.
    pub kind: TypeKind,
    /// The base class FQN, if any (classes only; always `None` for interfaces).
    pub base: Option<String>,
    /// Interfaces declared directly on this type (for a class: implemented
    /// interfaces; for an interface: its own parent interfaces).
    pub interfaces: Vec<String>,
}

impl TypeDescriptor {
    /// Shorthand for a leaf class with no base and no declared interfaces.
    pub fn class() -> Self {
        TypeDescriptor { kind: TypeKind::Class, base: None, interfaces: Vec::new() }
    }

    /// Shorthand for a leaf interface with no parents.
    pub fn interface() -> Self {
        TypeDescriptor { kind: TypeKind::Interface, base: None, interfaces: Vec::new() }
    }

    /// Builder-style: set the base class FQN.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Builder-style: append declared/parent interfaces.
    pub fn with_interfaces<I: IntoIterator<Item = S>, S: Into<String>>(mut self, ifaces: I) -> Self {
        self.interfaces.extend(ifaces.into_iter().map(Into::into));
        self
    }
}

/// The external type/assembly loader, consumed by the interface-closure
/// builder (`crate::interfaces::interface_closure`) and by
/// `ObjectStore::register_type`/`type_fqn`.
pub trait TypeResolver {
    /// Resolve a fully qualified name to its descriptor.
    ///
    /// Implementations should fail with [`ObjectStoreError::InvalidType`]
    /// only when the FQN cannot be resolved at all; a resolved type of the
    /// *wrong kind* for the caller's purposes is instead reported by the
    /// caller (the closure builder), since only the caller knows what kind
    /// it expected.
    fn resolve_type(&self, fqn: &str) -> Result<TypeDescriptor, ObjectStoreError>;
}

/// An in-memory [`TypeResolver`] test double: a static table of FQN ->
/// descriptor, populated with [`StaticTypeResolver::define`].
#[derive(Debug, Default, Clone)]
pub struct StaticTypeResolver {
    types: std::collections::HashMap<String, TypeDescriptor>,
}

impl StaticTypeResolver {
    /// An empty resolver; register types with [`StaticTypeResolver::define`].
    pub fn new() -> Self {
        StaticTypeResolver::default()
    }

    /// Register (or replace) the descriptor for a fully qualified name.
    pub fn define(&mut self, fqn: impl Into<String>, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(fqn.into(), descriptor);
        self
    }
}

impl TypeResolver for StaticTypeResolver {
    fn resolve_type(&self, fqn: &str) -> Result<TypeDescriptor, ObjectStoreError> {
        self.types.get(fqn).cloned().ok_or_else(|| ObjectStoreError::InvalidType {
            fqn: fqn.to_string(),
            expected: "a registered type",
        })
    }
}
