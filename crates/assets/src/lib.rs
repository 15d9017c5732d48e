//! Asset handles consumed by the render projection, and the loader that
//! resolves them.
//!
//! The core never loads anything itself. Every handle it sees has already
//! been resolved, so a scene is never built from a partially-loaded set.
//!
//! # Layout
//! Models are glTF files; only node/material metadata is read (names, node
//! translation and scale, base color). Geometry is drawn as boxes.

mod catalog;
mod handle;
mod loader;

pub use catalog::{AssetVariants, FloorPalette};
pub use handle::{AssetHandle, AssetId, MeshNode};
pub use loader::{AssetError, AssetLoader};
