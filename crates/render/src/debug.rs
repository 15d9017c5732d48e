use std::collections::BTreeMap;
use std::fmt::Write as _;

use tiledrive_assets::AssetHandle;
use tiledrive_common::{Color, Transform};

use crate::backend::{NodeId, RenderBackend};
use crate::projection::TilePrimitive;

/// What a recorded node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNodeKind {
    Tile { color: Color },
    Model { asset: String, parts: usize },
}

/// A node recorded by [`DebugSceneRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: SceneNodeKind,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// In-memory render backend.
///
/// Records every attached node so tests and the CLI can inspect what a GPU
/// backend would have drawn.
#[derive(Debug, Default)]
pub struct DebugSceneRenderer {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u32,
}

impl DebugSceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Human-readable listing of every node, in attach order.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Scene ({} nodes) ===", self.nodes.len());
        for (id, node) in &self.nodes {
            let p = node.transform.position;
            let what = match &node.kind {
                SceneNodeKind::Tile { color } => format!(
                    "tile  rgb=({:.2}, {:.2}, {:.2})",
                    color.0[0], color.0[1], color.0[2]
                ),
                SceneNodeKind::Model { asset, parts } => format!("model {asset} parts={parts}"),
            };
            let _ = writeln!(
                out,
                "  [{:>4}] {what} pos=({:.2}, {:.2}, {:.2}) cast={} receive={}",
                id.0, p.x, p.y, p.z, node.cast_shadow, node.receive_shadow
            );
        }
        out
    }

    fn insert(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }
}

impl RenderBackend for DebugSceneRenderer {
    fn add_tile(&mut self, tile: &TilePrimitive) -> NodeId {
        self.insert(SceneNode {
            kind: SceneNodeKind::Tile { color: tile.color },
            transform: Transform::from_position(tile.position),
            cast_shadow: false,
            receive_shadow: tile.receive_shadow,
        })
    }

    fn add_model(&mut self, asset: &AssetHandle, transform: Transform) -> NodeId {
        self.insert(SceneNode {
            kind: SceneNodeKind::Model {
                asset: asset.name.clone(),
                parts: asset.meshes.len(),
            },
            transform,
            cast_shadow: asset.casts_shadow(),
            receive_shadow: asset.receives_shadow(),
        })
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) {
        match self.nodes.get_mut(&node) {
            Some(n) => n.transform = transform,
            None => tracing::warn!(?node, "transform for unknown node ignored"),
        }
    }

    fn remove(&mut self, node: NodeId) {
        self.nodes.remove(&node);
    }

    fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::attach;
    use crate::projection::project;
    use glam::Vec3;
    use tiledrive_assets::{AssetId, AssetVariants, FloorPalette, MeshNode};
    use tiledrive_kernel::{GridLayout, GridWorld};

    fn scene_for_center_obstacle() -> (DebugSceneRenderer, Vec<NodeId>) {
        let mut obstacles = vec![vec![0; 3]; 3];
        obstacles[1][1] = 1;
        let world = GridWorld::new(vec![vec![0; 3]; 3], obstacles).unwrap();
        let variants = AssetVariants::new(vec![AssetHandle::new(
            AssetId(1),
            "tree",
            vec![MeshNode::unit("crown", Color::GRAY)],
        )]);
        let palette = FloorPalette::new(vec![Color::WHITE]);
        let prims = project(&world, &GridLayout::default(), &palette, &variants).unwrap();

        let mut renderer = DebugSceneRenderer::new();
        let ids = attach(&mut renderer, &prims);
        (renderer, ids)
    }

    #[test]
    fn empty_scene_dump() {
        let renderer = DebugSceneRenderer::new();
        assert_eq!(renderer.node_count(), 0);
        assert!(renderer.dump().contains("0 nodes"));
    }

    #[test]
    fn attach_records_projection_with_shadow_flags() {
        let (renderer, ids) = scene_for_center_obstacle();
        assert_eq!(ids.len(), 10);
        assert_eq!(renderer.node_count(), 10);

        let tiles = renderer
            .nodes()
            .filter(|(_, n)| matches!(n.kind, SceneNodeKind::Tile { .. }))
            .count();
        assert_eq!(tiles, 9);

        let (_, model) = renderer
            .nodes()
            .find(|(_, n)| matches!(n.kind, SceneNodeKind::Model { .. }))
            .unwrap();
        assert!(model.cast_shadow);
        assert_eq!(model.transform.position, Vec3::new(1.0, 0.0, 1.0));

        let dump = renderer.dump();
        assert!(dump.contains("10 nodes"));
        assert!(dump.contains("model tree"));
    }

    #[test]
    fn partly_casting_model_is_a_caster() {
        let mut car = AssetHandle::new(
            AssetId(9),
            "car",
            vec![
                MeshNode::unit("chassis", Color::GRAY),
                MeshNode::unit("wheel", Color::GRAY),
            ],
        );
        car.meshes[0].cast_shadow = true;
        let mut renderer = DebugSceneRenderer::new();
        let node = renderer.add_model(&car, Transform::default());
        assert!(renderer.node(node).unwrap().cast_shadow);
        assert!(!renderer.node(node).unwrap().receive_shadow);
    }

    #[test]
    fn set_transform_and_remove() {
        let (mut renderer, ids) = scene_for_center_obstacle();
        let target = ids[0];
        let moved = Transform::from_position(Vec3::new(4.0, 0.0, 2.0));
        renderer.set_transform(target, moved);
        assert_eq!(renderer.node(target).unwrap().transform, moved);

        renderer.remove(target);
        assert!(renderer.node(target).is_none());
        assert_eq!(renderer.node_count(), 9);
        // Unknown ids are tolerated.
        renderer.set_transform(target, moved);
        renderer.remove(target);
    }
}
