use std::path::PathBuf;

use tiledrive_assets::AssetError;
use tiledrive_kernel::GridError;
use tiledrive_physics::PhysicsError;
use tiledrive_render::ProjectionError;

/// Errors raised while loading or building a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("map: {0}")]
    Grid(#[from] GridError),

    #[error("projection: {0}")]
    Projection(#[from] ProjectionError),

    #[error("physics: {0}")]
    Physics(#[from] PhysicsError),

    #[error("asset: {0}")]
    Asset(#[from] AssetError),

    #[error("failed to read config {path}: {source}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid scene config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("floor color {index} is not a #rrggbb hex string: {value:?}")]
    InvalidColor { index: usize, value: String },

    #[error("timestep must be positive, got {0}")]
    InvalidTimestep(f32),
}
