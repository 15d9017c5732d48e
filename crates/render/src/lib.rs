//! Rendering Adapter: the renderer-agnostic backend trait and the projection
//! of a grid world into placed primitives.
//!
//! # Invariants
//! - Renderers never mutate world truth; they receive placed primitives and
//!   transforms.
//! - Tiles and obstacle instances are positioned through the same
//!   [`GridLayout`](tiledrive_kernel::GridLayout) the collision compiler uses.
//! - Projection output is in row-major cell order.
//!
//! # Backends
//! [`DebugSceneRenderer`] is an in-memory backend that records nodes and can
//! dump them as text. The GPU backend lives in `tiledrive-render-wgpu` and
//! implements the same trait.

mod backend;
mod debug;
mod projection;

pub use backend::{NodeId, RenderBackend, attach};
pub use debug::{DebugSceneRenderer, SceneNode, SceneNodeKind};
pub use projection::{AssetInstance, PlacedPrimitive, ProjectionError, TilePrimitive, project};
