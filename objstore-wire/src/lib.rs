//! Wire frames and error kinds shared between the objstore kernel and host
//!
//! This crate carries none of the actual request dispatch or child-process
//! transport logic (both out of scope per `SPEC_FULL.md` ) — only the
//! handful of JSON shapes that cross the kernel/host boundary carrying
//! object identity, and the `ObjectStoreError` kinds both sides need to
//! agree on.

#![warn(missing_docs, missing_debug_implementations)]

mod error;
mod frames;
mod instance_id;

pub use error::ObjectStoreError;
pub use frames::{DelApiTag, DelRequest, DelResponse, ObjectRef, ReleaseNotification};
pub use instance_id::{InstanceId, InvalidInstanceId};
