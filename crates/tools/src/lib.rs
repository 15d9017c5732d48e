//! Developer tooling: read-only inspection of maps and running scenes.
//!
//! # Invariants
//! - Inspection never mutates a scene or its backends.

mod inspector;

pub use inspector::{MapSummary, SceneInspector, SceneSummary, VehicleInfo};
