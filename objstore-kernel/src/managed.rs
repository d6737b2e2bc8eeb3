//! The marker trait real referents must implement to be stored behind a
//! type-erased handle.
//!
//! The store must hold referents of many unrelated concrete types behind
//! one map, so `Managed` is the `downcast_rs::DowncastSync` marker trait
//! that makes `Arc<dyn Managed>` downcastable back to the caller's concrete
//! type.

use downcast_rs::DowncastSync;

/// Marker trait for behavioral objects the store can manage.
///
/// Blanket-implemented for every `'static + Send + Sync` type, mirroring
/// how `downcast_rs::DowncastSync` itself only requires those bounds — value
/// types (primitives, data-only records) are never registered in the first
/// place, so this trait does not attempt to restrict *which* types may
/// implement it.
pub trait Managed: DowncastSync {}

impl<T: 'static + Send + Sync> Managed for T {}

downcast_rs::impl_downcast!(sync Managed);
