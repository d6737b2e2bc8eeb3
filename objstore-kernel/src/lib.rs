//! Kernel-side managed object store.
//!
//! The kernel process (the dynamic-runtime child in a cross-runtime RPC
//! bridge) is where real objects live. This crate tracks every object the
//! host language has been handed a reference to, mints and reanimates weak
//! proxies for them, computes the interface sets reported on the wire, and
//! drains the ids the host needs to be told have become unreachable.
//!
//! A handful of focused submodules (`handle`, `proxy`, `finalization`,
//! `interfaces`) compose into one state type, [`store::ObjectStore`], driven
//! by a single-threaded dispatch loop, [`session::Session`].

#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod finalization;
mod handle;
mod interfaces;
mod listener;
mod managed;
mod proxy;
mod resolve;
mod sequence;
pub mod session;
mod store;

pub use config::{SequenceConfig, StoreConfig};
pub use handle::ProxyOutcome;
pub use interfaces::{interface_closure, merge_declared_interfaces, minimise, single_interface_closure};
pub use listener::StoreListener;
pub use managed::Managed;
pub use proxy::Proxy;
pub use resolve::{StaticTypeResolver, TypeDescriptor, TypeKind, TypeResolver};
pub use sequence::InstanceIdSequence;
pub use store::ObjectStore;
