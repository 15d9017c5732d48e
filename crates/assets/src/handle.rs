use glam::Vec3;
use serde::{Deserialize, Serialize};
use tiledrive_common::Color;

/// Content-addressed asset ID computed from the source file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(pub u64);

/// One drawable part of a model, relative to the model origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub name: String,
    pub offset: Vec3,
    pub half_extents: Vec3,
    pub color: Color,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl MeshNode {
    /// Unit-sized box part at the model origin.
    pub fn unit(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            offset: Vec3::ZERO,
            half_extents: Vec3::splat(0.5),
            color,
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

/// A fully loaded model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetHandle {
    pub id: AssetId,
    pub name: String,
    pub meshes: Vec<MeshNode>,
}

impl AssetHandle {
    pub fn new(id: AssetId, name: impl Into<String>, meshes: Vec<MeshNode>) -> Self {
        Self {
            id,
            name: name.into(),
            meshes,
        }
    }

    /// Independent copy for placing in a scene. Changing the instance's
    /// shadow flags or parts never touches the source handle.
    pub fn instantiate(&self) -> Self {
        self.clone()
    }

    /// Mark every part as shadow-casting.
    pub fn set_cast_shadow(&mut self, cast: bool) {
        for mesh in &mut self.meshes {
            mesh.cast_shadow = cast;
        }
    }

    /// A model casts a shadow when any of its parts does.
    pub fn casts_shadow(&self) -> bool {
        self.meshes.iter().any(|m| m.cast_shadow)
    }

    pub fn receives_shadow(&self) -> bool {
        self.meshes.iter().any(|m| m.receive_shadow)
    }
}
