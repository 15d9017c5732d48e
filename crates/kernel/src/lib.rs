//! Grid World Model: the immutable tile map and the coordinate mapping shared
//! by collision and rendering.
//!
//! # Invariants
//! - Floor and obstacle grids are rectangular and have identical dimensions.
//! - A `GridWorld` never changes after construction.
//! - Every consumer converts cells to world space through [`GridLayout`].

mod layout;
pub mod world;

pub use layout::GridLayout;
pub use world::{CellCoord, FloorTypeId, GridError, GridWorld, MapDefinition, ObstacleTypeId};
