//! Host-side mirror of the kernel's managed object store.
//!
//! The host process (the garbage-collected parent runtime in a
//! cross-runtime RPC bridge) never holds the real objects a kernel
//! invocation returns — only references to them. This crate is the
//! bookkeeping that turns those references into weakly-observed proxies,
//! tracks which ones the host itself is responsible for keeping alive, and
//! emits `del` requests once a proxy is collected, as described under
//! "Host reference table" in this repository's `SPEC_FULL.md`.

#![warn(missing_docs, missing_debug_implementations)]

mod delete_queue;
mod proxy;
pub mod session;
mod table;

pub use proxy::HostProxy;
pub use session::{HostSession, HostTransport};
pub use table::ReferenceTable;
