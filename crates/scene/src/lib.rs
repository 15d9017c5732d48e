//! Scene context for a tile-grid driving world.
//!
//! A [`Scene`] owns the physics and render backends, the static map body,
//! the projected map nodes and the drivable vehicle. Every frame runs the
//! same fixed sequence: drive forces, physics step, pose sync, render
//! transform update.
//!
//! Everything the scene needs is resolved before construction:
//! [`SceneConfig`] names the files, [`SceneAssets`] loads them, and
//! [`Scene::build`] only ever sees loaded handles.

mod clock;
mod config;
mod error;
mod scene;

pub use clock::FixedTimestep;
pub use config::{SceneAssets, SceneConfig, SpawnPoint};
pub use error::SceneError;
pub use scene::Scene;
