use std::collections::BTreeMap;

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tiledrive_assets::AssetHandle;
use tiledrive_common::Transform;
use tiledrive_render::{NodeId, RenderBackend, TilePrimitive};

/// Height of a floor tile slab. Its top face sits at the tile position.
pub const TILE_THICKNESS: f32 = 0.02;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, color: [f32; 4]) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color,
        }
    }
}

/// Unit-cube part of a node, in node space.
#[derive(Debug, Clone, Copy)]
struct Part {
    local: Mat4,
    color: [f32; 4],
}

#[derive(Debug, Clone)]
struct DrawNode {
    parts: Vec<Part>,
    transform: Transform,
    cast_shadow: bool,
}

/// GPU-free node store behind [`crate::WgpuRenderer`].
#[derive(Debug, Default)]
pub struct BoxScene {
    nodes: BTreeMap<NodeId, DrawNode>,
    next_id: u32,
}

impl BoxScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of boxes a frame draws.
    pub fn instance_count(&self) -> usize {
        self.nodes.values().map(|n| n.parts.len()).sum()
    }

    /// Nodes flagged to cast shadows.
    pub fn shadow_casters(&self) -> usize {
        self.nodes.values().filter(|n| n.cast_shadow).count()
    }

    pub fn transform(&self, node: NodeId) -> Option<Transform> {
        self.nodes.get(&node).map(|n| n.transform)
    }

    pub(crate) fn instances(&self) -> Vec<InstanceData> {
        let mut out = Vec::with_capacity(self.instance_count());
        for node in self.nodes.values() {
            let t = node.transform;
            let world = Mat4::from_scale_rotation_translation(t.scale, t.rotation, t.position);
            out.extend(
                node.parts
                    .iter()
                    .map(|part| InstanceData::new(world * part.local, part.color)),
            );
        }
        out
    }

    fn insert(&mut self, node: DrawNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }
}

impl RenderBackend for BoxScene {
    fn add_tile(&mut self, tile: &TilePrimitive) -> NodeId {
        let slab = Mat4::from_scale_rotation_translation(
            Vec3::new(1.0, TILE_THICKNESS, 1.0),
            glam::Quat::IDENTITY,
            Vec3::new(0.0, -TILE_THICKNESS * 0.5, 0.0),
        );
        self.insert(DrawNode {
            parts: vec![Part {
                local: slab,
                color: tile.color.0,
            }],
            transform: Transform::from_position(tile.position),
            cast_shadow: false,
        })
    }

    fn add_model(&mut self, asset: &AssetHandle, transform: Transform) -> NodeId {
        let parts = asset
            .meshes
            .iter()
            .map(|mesh| Part {
                local: Mat4::from_scale_rotation_translation(
                    mesh.half_extents * 2.0,
                    glam::Quat::IDENTITY,
                    mesh.offset,
                ),
                color: mesh.color.0,
            })
            .collect();
        self.insert(DrawNode {
            parts,
            transform,
            cast_shadow: asset.casts_shadow(),
        })
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.transform = transform;
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
    use glam::Vec4;
    use tiledrive_assets::{AssetId, AssetVariants, FloorPalette, MeshNode};
    use tiledrive_common::Color;
    use tiledrive_kernel::{GridLayout, GridWorld};
    use tiledrive_render::{attach, project};

    fn column(data: &InstanceData, i: usize) -> Vec4 {
        let cols = [data.model_0, data.model_1, data.model_2, data.model_3];
        Vec4::from_array(cols[i])
    }

    #[test]
    fn tile_is_a_slab_below_its_position() {
        let mut scene = BoxScene::new();
        let world = GridWorld::new(vec![vec![0]], vec![vec![0]]).unwrap();
        let prims = project(
            &world,
            &GridLayout::default(),
            &FloorPalette::new(vec![Color::WHITE]),
            &AssetVariants::default(),
        )
        .unwrap();
        attach(&mut scene, &prims);

        let instances = scene.instances();
        assert_eq!(instances.len(), 1);
        let translation = column(&instances[0], 3);
        assert!((translation.y + TILE_THICKNESS * 0.5).abs() < 1e-6);
        assert_eq!(column(&instances[0], 0).x, 1.0);
        assert_eq!(instances[0].color, Color::WHITE.0);
    }

    #[test]
    fn model_parts_follow_node_transform() {
        let mut scene = BoxScene::new();
        let mut part = MeshNode::unit("cabin", Color::GRAY);
        part.offset = Vec3::new(0.0, 1.0, 0.0);
        part.half_extents = Vec3::splat(0.25);
        let asset = AssetHandle::new(AssetId(9), "car", vec![MeshNode::unit("body", Color::WHITE), part]);

        let node = scene.add_model(&asset, Transform::from_position(Vec3::new(2.0, 0.0, 3.0)));
        assert_eq!(scene.instance_count(), 2);
        let cabin = scene.instances()[1];
        assert_eq!(column(&cabin, 3), Vec4::new(2.0, 1.0, 3.0, 1.0));
        assert_eq!(column(&cabin, 1).y, 0.5);

        scene.set_transform(node, Transform::from_position(Vec3::new(5.0, 0.0, 0.0)));
        assert_eq!(column(&scene.instances()[1], 3), Vec4::new(5.0, 1.0, 0.0, 1.0));

        scene.remove(node);
        assert_eq!(scene.instance_count(), 0);
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn cast_shadow_flag_is_kept() {
        let mut scene = BoxScene::new();
        let mut asset = AssetHandle::new(AssetId(1), "tree", vec![MeshNode::unit("crown", Color::GRAY)]);
        scene.add_model(&asset, Transform::default());
        asset.set_cast_shadow(true);
        scene.add_model(&asset, Transform::default());
        assert_eq!(scene.shadow_casters(), 1);

        asset.meshes.push(MeshNode::unit("trunk", Color::GRAY));
        assert!(!asset.meshes[1].cast_shadow);
        scene.add_model(&asset, Transform::default());
        assert_eq!(scene.shadow_casters(), 2);
    }
}
