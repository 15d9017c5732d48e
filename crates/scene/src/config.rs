use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tiledrive_assets::{AssetHandle, AssetLoader, AssetVariants, FloorPalette};
use tiledrive_common::{Color, Pose};
use tiledrive_input::KeyBindings;
use tiledrive_kernel::{GridLayout, GridWorld};
use tiledrive_vehicle::DriveConfig;

use crate::error::SceneError;

/// Where the vehicle starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnPoint {
    pub position: Vec3,
    /// Heading around +Y, in degrees. 0 faces +Z.
    pub yaw_degrees: f32,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            position: Vec3::new(1.0, 0.5, 1.0),
            yaw_degrees: 0.0,
        }
    }
}

impl SpawnPoint {
    pub fn pose(&self) -> Pose {
        Pose::new(
            self.position,
            Quat::from_rotation_y(self.yaw_degrees.to_radians()),
        )
    }
}

/// Scene description, usually read from a YAML file.
///
/// Paths are relative to the directory passed to [`SceneConfig::load_world`]
/// and [`SceneAssets::load`], normally the config file's own directory.
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Map definition (JSON).
    pub map: PathBuf,
    /// Floor colors as `#rrggbb`, indexed by floor type.
    pub floor_colors: Vec<String>,
    /// Obstacle models; variant `v` uses entry `v - 1`.
    pub obstacle_models: Vec<PathBuf>,
    pub vehicle_model: PathBuf,
    pub layout: GridLayout,
    pub vehicle: DriveConfig,
    pub bindings: KeyBindings,
    pub spawn: SpawnPoint,
    pub gravity: Vec3,
    /// Simulation step in seconds.
    pub timestep: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            map: PathBuf::from("maps/default.json"),
            floor_colors: vec!["#4f8a3c".into(), "#c9b27c".into(), "#6b6b6b".into()],
            obstacle_models: vec![
                PathBuf::from("models/tree.gltf"),
                PathBuf::from("models/rock.gltf"),
            ],
            vehicle_model: PathBuf::from("models/car.gltf"),
            layout: GridLayout::default(),
            vehicle: DriveConfig::default(),
            bindings: KeyBindings::default(),
            spawn: SpawnPoint::default(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SceneError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SceneError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), map = %config.map.display(), "scene config loaded");
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        if !(self.timestep > 0.0) || !self.timestep.is_finite() {
            return Err(SceneError::InvalidTimestep(self.timestep));
        }
        self.palette().map(|_| ())
    }

    /// Parse the floor colors.
    pub fn palette(&self) -> Result<FloorPalette, SceneError> {
        self.floor_colors
            .iter()
            .enumerate()
            .map(|(index, value)| {
                Color::from_hex(value).ok_or_else(|| SceneError::InvalidColor {
                    index,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FloorPalette::new)
    }

    /// Load the map file relative to `base_dir`.
    pub fn load_world(&self, base_dir: impl AsRef<Path>) -> Result<GridWorld, SceneError> {
        Ok(GridWorld::load(base_dir.as_ref().join(&self.map))?)
    }
}

/// Everything a scene draws, loaded up front.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub palette: FloorPalette,
    pub variants: AssetVariants,
    pub vehicle: AssetHandle,
}

impl SceneAssets {
    /// Resolve every asset the config names. Fails if any one is missing or
    /// malformed.
    pub fn load(config: &SceneConfig, base_dir: impl AsRef<Path>) -> Result<Self, SceneError> {
        let loader = AssetLoader::new(base_dir.as_ref());
        let palette = config.palette()?;
        let variants = AssetVariants::new(loader.load_all(&config.obstacle_models)?);
        let vehicle = loader.load(&config.vehicle_model)?;
        tracing::debug!(
            colors = palette.len(),
            variants = variants.len(),
            vehicle = %vehicle.name,
            "scene assets resolved"
        );
        Ok(Self {
            palette,
            variants,
            vehicle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_is_default() {
        let config = SceneConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_fields() {
        let yaml = "\
map: maps/small.json
floor_colors: ['#ffffff']
vehicle:
  move_force: 30.0
spawn:
  position: [2.0, 1.0, 3.0]
  yaw_degrees: 90.0
";
        let config = SceneConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.map, PathBuf::from("maps/small.json"));
        assert_eq!(config.vehicle.move_force, 30.0);
        assert_eq!(config.vehicle.turn_torque, DriveConfig::default().turn_torque);
        assert_eq!(config.spawn.position, Vec3::new(2.0, 1.0, 3.0));
        assert_eq!(config.palette().unwrap().len(), 1);
    }

    #[test]
    fn yaml_roundtrip() {
        let config = SceneConfig::default();
        let back = SceneConfig::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn bad_color_is_reported_with_index() {
        let err = SceneConfig::from_yaml_str("floor_colors: ['#ffffff', 'green']").unwrap_err();
        assert!(matches!(err, SceneError::InvalidColor { index: 1, .. }));
    }

    #[test]
    fn non_positive_timestep_rejected() {
        let err = SceneConfig::from_yaml_str("timestep: 0.0").unwrap_err();
        assert!(matches!(err, SceneError::InvalidTimestep(_)));
    }

    #[test]
    fn spawn_yaw_rotates_about_y() {
        let spawn = SpawnPoint {
            position: Vec3::ZERO,
            yaw_degrees: 90.0,
        };
        let forward = spawn.pose().rotation * Vec3::Z;
        assert!(forward.abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn missing_assets_fail_as_a_whole() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneAssets::load(&SceneConfig::default(), dir.path()).unwrap_err();
        assert!(matches!(err, SceneError::Asset(_)));
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneConfig::load(dir.path().join("scene.yaml")).unwrap_err();
        assert!(matches!(err, SceneError::ReadConfig { .. }));
    }
}
