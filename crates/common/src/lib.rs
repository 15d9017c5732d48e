//! Shared value types used across the tiledrive crates.
//!
//! Nothing here knows about grids, physics engines, or renderers. These are
//! the plain values that cross those boundaries.

mod types;

pub use types::{Color, Pose, Transform};
