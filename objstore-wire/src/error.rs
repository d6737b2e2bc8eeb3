use std::fmt;

use crate::InstanceId;

/// Transport-independent error kinds produced by the object store.
///
/// Implemented with a manual `Display`/`Error` impl rather than a derive
/// macro: every variant here is surfaced verbatim to the peer as the
/// `message` field of an error response, so its wording is part of the wire
/// contract.
#[derive(Clone, Debug)]
pub enum ObjectStoreError {
    /// `register` was called with a null instance.
    NullArgument,
    /// An operation named an instance id with no live handle.
    UnknownReference(InstanceId),
    /// `del` was requested for a handle whose proxy is still live.
    StillReachable(InstanceId),
    /// `resolveType` returned a type of the wrong kind.
    InvalidType {
        /// The fully qualified name that was resolved.
        fqn: String,
        /// What the caller expected it to be.
        expected: &'static str,
    },
    /// The real referent behind a handle has been reclaimed while the
    /// handle still exists. Unreachable in the proxy-weak design this crate
    /// implements (see `DESIGN.md`); kept as a variant because `del` and
    /// `dereference` must still return *some* error type for it at the API
    /// boundary.
    CollectedReferent(InstanceId),
}

impl fmt::Display for ObjectStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectStoreError::NullArgument => write!(f, "NullArgument: instance must not be null"),
            ObjectStoreError::UnknownReference(id) => {
                write!(f, "UnknownReference: no managed object for {id}")
            }
            ObjectStoreError::StillReachable(id) => {
                write!(f, "StillReachable: {id} still has a live proxy")
            }
            ObjectStoreError::InvalidType { fqn, expected } => {
                write!(f, "InvalidType: {fqn} is not a {expected}")
            }
            ObjectStoreError::CollectedReferent(id) => {
                write!(f, "CollectedReferent: the referent behind {id} was reclaimed")
            }
        }
    }
}

impl std::error::Error for ObjectStoreError {}

impl ObjectStoreError {
    /// The stable, wire-facing name of this error's kind, as used in the
    /// `{ "error": "..." }` field of a `del` response.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectStoreError::NullArgument => "NullArgument",
            ObjectStoreError::UnknownReference(_) => "UnknownReference",
            ObjectStoreError::StillReachable(_) => "StillReachable",
            ObjectStoreError::InvalidType { .. } => "InvalidType",
            ObjectStoreError::CollectedReferent(_) => "CollectedReferent",
        }
    }
}
