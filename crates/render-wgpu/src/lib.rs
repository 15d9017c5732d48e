//! wgpu render backend for tile-grid scenes.
//!
//! Every node is drawn as a set of lit boxes: floor tiles as thin slabs,
//! models as one box per mesh part. Node bookkeeping lives in [`BoxScene`],
//! which has no GPU state and is what the tests exercise.
//!
//! # Invariants
//! - The renderer never reads or writes physics state. It only sees the
//!   transforms handed to it through `RenderBackend`.
//! - Camera motion is outside the simulation.

mod boxes;
mod camera;
mod gpu;
mod shaders;

pub use boxes::{BoxScene, TILE_THICKNESS};
pub use camera::ChaseCamera;
pub use gpu::WgpuRenderer;
