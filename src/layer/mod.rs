//! Cached dependency layers
//!
//! A layer is an installed artifact plus a metadata record. The record is
//! compared against the newly resolved dependency to decide whether the
//! layer can be reused verbatim. `built_at` only changes on rebuild, which
//! makes reuse observable from outside.

pub mod decision;
pub mod manifest;
pub mod store;

pub use decision::{decide, CacheDecision};
pub use manifest::{LayerManifest, LayerMetadata, LayerTypes};
pub use store::{FileLayerStore, LayerStore};
