//! Physics: the backend capability trait, the tile-grid collision compiler,
//! and a rapier3d implementation of the backend.
//!
//! # Invariants
//! - Core code talks to physics only through [`PhysicsBackend`].
//! - The compiled map is one static body; obstacle shapes use the same
//!   [`GridLayout`](tiledrive_kernel::GridLayout) as the render projection.
//! - Forces and torques last for exactly one `step`.

mod backend;
mod compiler;
mod error;
mod rapier;

pub use backend::{BodyDesc, BodyHandle, BoxShape, PhysicsBackend};
pub use compiler::{
    CompoundBody, GROUND_HALF_THICKNESS, OBSTACLE_HALF_EXTENTS, ObstacleShape, compile,
    instantiate,
};
pub use error::PhysicsError;
pub use rapier::RapierBackend;
