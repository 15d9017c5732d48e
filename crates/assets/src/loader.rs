use glam::Vec3;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tiledrive_common::Color;

use crate::handle::{AssetHandle, AssetId, MeshNode};

/// Errors from asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("glTF parse error in {name}: {reason}")]
    GltfParse { name: String, reason: String },
    #[error("model {0} contains no meshes")]
    NoMeshes(String),
}

const DEFAULT_BASE_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Resolves model files into [`AssetHandle`]s.
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    base_dir: PathBuf,
}

impl AssetLoader {
    /// Loader resolving relative paths against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Load one glTF model.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<AssetHandle, AssetError> {
        let path = self.base_dir.join(path.as_ref());
        let bytes = std::fs::read(&path).map_err(|source| AssetError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unnamed")
            .to_string();
        let handle = parse_gltf(&name, &bytes)?;
        tracing::debug!(
            name = %handle.name,
            id = handle.id.0,
            meshes = handle.meshes.len(),
            "asset loaded"
        );
        Ok(handle)
    }

    /// Load every model or none: the first failure aborts the whole set.
    pub fn load_all<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<AssetHandle>, AssetError> {
        paths.iter().map(|p| self.load(p)).collect()
    }
}

/// Build a handle from glTF JSON bytes.
///
/// Each node referencing a mesh becomes one part: its translation is the
/// part offset, its scale the full box size. Without mesh nodes, every mesh
/// becomes a unit part at the origin.
pub(crate) fn parse_gltf(name: &str, bytes: &[u8]) -> Result<AssetHandle, AssetError> {
    let json: Value = serde_json::from_slice(bytes).map_err(|e| AssetError::GltfParse {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    let meshes = json
        .get("meshes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let materials = json
        .get("materials")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let mesh_color = |mesh_index: usize| -> Color {
        meshes
            .get(mesh_index)
            .and_then(|m| m.pointer("/primitives/0/material"))
            .and_then(Value::as_u64)
            .and_then(|i| materials.get(i as usize))
            .map(base_color)
            .unwrap_or(Color(DEFAULT_BASE_COLOR))
    };
    let mesh_name = |mesh_index: usize| -> String {
        meshes
            .get(mesh_index)
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{name}_{mesh_index}"))
    };

    let mut parts = Vec::new();
    if let Some(nodes) = json.get("nodes").and_then(Value::as_array) {
        for node in nodes {
            let Some(mesh_index) = node.get("mesh").and_then(Value::as_u64) else {
                continue;
            };
            let mesh_index = mesh_index as usize;
            if mesh_index >= meshes.len() {
                return Err(AssetError::GltfParse {
                    name: name.to_string(),
                    reason: format!("node references missing mesh {mesh_index}"),
                });
            }
            let part_name = node
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| mesh_name(mesh_index));
            let offset = vec3_field(node, "translation").unwrap_or(Vec3::ZERO);
            let size = vec3_field(node, "scale").unwrap_or(Vec3::ONE);
            parts.push(MeshNode {
                name: part_name,
                offset,
                half_extents: size * 0.5,
                color: mesh_color(mesh_index),
                cast_shadow: false,
                receive_shadow: false,
            });
        }
    }
    if parts.is_empty() {
        parts = (0..meshes.len())
            .map(|i| MeshNode::unit(mesh_name(i), mesh_color(i)))
            .collect();
    }
    if parts.is_empty() {
        return Err(AssetError::NoMeshes(name.to_string()));
    }

    Ok(AssetHandle::new(content_hash(bytes), name, parts))
}

fn base_color(material: &Value) -> Color {
    let mut color = DEFAULT_BASE_COLOR;
    if let Some(arr) = material
        .pointer("/pbrMetallicRoughness/baseColorFactor")
        .and_then(Value::as_array)
    {
        for (i, v) in arr.iter().enumerate().take(4) {
            if let Some(f) = v.as_f64() {
                color[i] = f as f32;
            }
        }
    }
    Color(color)
}

fn vec3_field(node: &Value, key: &str) -> Option<Vec3> {
    let arr = node.get(key)?.as_array()?;
    if arr.len() != 3 {
        return None;
    }
    Some(Vec3::new(
        arr[0].as_f64()? as f32,
        arr[1].as_f64()? as f32,
        arr[2].as_f64()? as f32,
    ))
}

fn content_hash(bytes: &[u8]) -> AssetId {
    let digest = Sha256::digest(bytes);
    let mut id = [0u8; 8];
    id.copy_from_slice(&digest[..8]);
    AssetId(u64::from_le_bytes(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: &str = r#"{
        "asset": {"version": "2.0"},
        "materials": [
            {"name": "bark", "pbrMetallicRoughness": {"baseColorFactor": [0.4, 0.25, 0.1, 1.0]}},
            {"name": "leaves", "pbrMetallicRoughness": {"baseColorFactor": [0.1, 0.5, 0.1, 1.0]}}
        ],
        "meshes": [
            {"name": "trunk", "primitives": [{"material": 0}]},
            {"name": "crown", "primitives": [{"material": 1}]}
        ],
        "nodes": [
            {"name": "trunk", "mesh": 0, "translation": [0, 0.5, 0], "scale": [0.3, 1.0, 0.3]},
            {"name": "crown", "mesh": 1, "translation": [0, 1.4, 0], "scale": [1.0, 1.0, 1.0]},
            {"name": "empty"}
        ]
    }"#;

    #[test]
    fn parses_nodes_into_parts() {
        let handle = parse_gltf("tree", TREE.as_bytes()).unwrap();
        assert_eq!(handle.name, "tree");
        assert_eq!(handle.meshes.len(), 2);

        let trunk = &handle.meshes[0];
        assert_eq!(trunk.offset, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(trunk.half_extents, Vec3::new(0.15, 0.5, 0.15));
        assert!((trunk.color.0[0] - 0.4).abs() < 1e-6);
        assert!(!trunk.cast_shadow);
    }

    #[test]
    fn meshes_without_nodes_become_unit_parts() {
        let json = r#"{"meshes": [{"name": "rock", "primitives": [{}]}]}"#;
        let handle = parse_gltf("rock", json.as_bytes()).unwrap();
        assert_eq!(handle.meshes.len(), 1);
        assert_eq!(handle.meshes[0].name, "rock");
        assert_eq!(handle.meshes[0].half_extents, Vec3::splat(0.5));
        assert_eq!(handle.meshes[0].color, Color(DEFAULT_BASE_COLOR));
    }

    #[test]
    fn model_without_meshes_is_an_error() {
        let err = parse_gltf("empty", br#"{"asset": {"version": "2.0"}}"#).unwrap_err();
        assert!(matches!(err, AssetError::NoMeshes(_)));
    }

    #[test]
    fn dangling_mesh_reference_is_an_error() {
        let json = r#"{"meshes": [], "nodes": [{"mesh": 3}]}"#;
        let err = parse_gltf("broken", json.as_bytes()).unwrap_err();
        assert!(matches!(err, AssetError::GltfParse { .. }));
    }

    #[test]
    fn identical_bytes_share_an_id() {
        let a = parse_gltf("a", TREE.as_bytes()).unwrap();
        let b = parse_gltf("b", TREE.as_bytes()).unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn load_all_fails_as_a_whole() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tree.gltf"), TREE).unwrap();
        let loader = AssetLoader::new(dir.path());

        let loaded = loader.load_all(&["tree.gltf"]).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "tree");

        let err = loader.load_all(&["tree.gltf", "missing.gltf"]).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }
}
