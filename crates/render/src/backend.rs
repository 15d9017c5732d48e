use tiledrive_assets::AssetHandle;
use tiledrive_common::Transform;

use crate::projection::{PlacedPrimitive, TilePrimitive};

/// Handle to a node attached to a render backend's scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Renderer-agnostic scene construction. All renderers implement this trait.
///
/// Backends create primitives and attach them to their scene container.
/// They keep whatever shadow flags the primitives carry.
pub trait RenderBackend {
    /// Attach a flat floor tile.
    fn add_tile(&mut self, tile: &TilePrimitive) -> NodeId;

    /// Attach a model with an initial transform. The backend takes its own
    /// copy of whatever it needs from `asset`.
    fn add_model(&mut self, asset: &AssetHandle, transform: Transform) -> NodeId;

    /// Move an attached node.
    fn set_transform(&mut self, node: NodeId, transform: Transform);

    /// Detach a node. Unknown ids are ignored.
    fn remove(&mut self, node: NodeId);

    /// Number of attached nodes.
    fn node_count(&self) -> usize;
}

/// Attach projected primitives in order, returning their node ids.
pub fn attach<R: RenderBackend + ?Sized>(
    backend: &mut R,
    primitives: &[PlacedPrimitive],
) -> Vec<NodeId> {
    primitives
        .iter()
        .map(|prim| match prim {
            PlacedPrimitive::Tile(tile) => backend.add_tile(tile),
            PlacedPrimitive::Instance(instance) => {
                backend.add_model(&instance.asset, Transform::from_position(instance.position))
            }
        })
        .collect()
}
