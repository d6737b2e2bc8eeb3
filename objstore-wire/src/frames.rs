//! The JSON frame shapes that carry object references across the boundary.
//!
//! This module intentionally does not attempt to model a general
//! request/response envelope (the JSON codec for the surrounding RPC
//! protocol is out of scope) — only three shapes: the object reference
//! itself, the `release` notification, and the `del` request/response pair.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{InstanceId, ObjectStoreError};

/// `{ "$jsii.byref": "«fqn»@«n»", "$jsii.interfaces"?: ["fqn", …] }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    /// The instance id this reference points at.
    #[serde(rename = "$jsii.byref")]
    pub instance_id: InstanceId,
    /// The declared-interfaces list, present iff non-empty after minimisation.
    #[serde(rename = "$jsii.interfaces", skip_serializing_if = "Option::is_none", default)]
    pub interfaces: Option<Vec<String>>,
    /// Any fields neither side recognises are preserved verbatim on round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ObjectRef {
    /// Build a reference with no extra fields, lexicographically sorting
    /// and dropping the interfaces list when it is empty.
    pub fn new(instance_id: InstanceId, declared_interfaces: &BTreeSet<String>) -> Self {
        let interfaces = if declared_interfaces.is_empty() {
            None
        } else {
            Some(declared_interfaces.iter().cloned().collect())
        };
        ObjectRef { instance_id, interfaces, extra: serde_json::Map::new() }
    }
}

/// `{ "release": ["«fqn»@«n»", …] }`, written as a full JSON line before the
/// response line it is piggybacked on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNotification {
    /// The instance ids `finalized_instance_ids()` returned this tick.
    pub release: Vec<InstanceId>,
}

impl ReleaseNotification {
    /// `None` when there is nothing to report — the notification must never
    /// be emitted empty (it is elided entirely rather than sent as `[]`).
    pub fn non_empty(ids: Vec<InstanceId>) -> Option<Self> {
        if ids.is_empty() {
            None
        } else {
            Some(ReleaseNotification { release: ids })
        }
    }
}

/// `{ "api": "del", "objref": { "$jsii.byref": "…" } }`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelRequest {
    /// Always the literal string `"del"`; kept as a field (rather than
    /// implied by the Rust type) because it is what actually appears on the
    /// wire and round-trips through `extra` on frames this crate does not
    /// otherwise recognise.
    pub api: DelApiTag,
    /// The instance id the host wants the kernel to stop tracking.
    pub objref: ObjectRef,
}

/// The literal `"del"` discriminant of a [`DelRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DelApiTag {
    /// Serializes as `"del"`.
    #[serde(rename = "del")]
    Del,
}

impl DelRequest {
    /// Build a `del` request for the given instance id.
    pub fn new(instance_id: InstanceId) -> Self {
        DelRequest {
            api: DelApiTag::Del,
            objref: ObjectRef { instance_id, interfaces: None, extra: serde_json::Map::new() },
        }
    }
}

/// Response to a [`DelRequest`]: `{ "ok": {} }` or
/// `{ "error": "StillReachable" | "UnknownReference", "message": "…" }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DelResponse {
    /// The instance was removed from the store.
    Ok {
        /// Always an empty object on the wire.
        ok: serde_json::Map<String, serde_json::Value>,
    },
    /// The instance could not be removed; see `error` for why.
    Err {
        /// One of `StillReachable`, `UnknownReference` (`InvalidType` and
        /// `CollectedReferent` never surface from `del` specifically).
        error: String,
        /// A human-readable explanation, safe to log or display verbatim.
        message: String,
    },
}

impl DelResponse {
    /// A successful `del` acknowledgment.
    pub fn ok() -> Self {
        DelResponse::Ok { ok: serde_json::Map::new() }
    }
}

impl From<&ObjectStoreError> for DelResponse {
    fn from(err: &ObjectStoreError) -> Self {
        DelResponse::Err { error: err.kind_name().to_string(), message: err.to_string() }
    }
}
