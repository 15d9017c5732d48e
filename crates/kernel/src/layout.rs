use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::world::{CellCoord, GridWorld};

/// Cell-to-world mapping shared by the collision compiler and the render
/// projection.
///
/// Visual primitives sit at `cell_position`. The static map body sits at
/// `body_origin` and places its shapes at `local_offset`, and
/// `body_origin + local_offset == cell_position` for every cell. Nothing else
/// in the workspace converts cell indices to coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridLayout {
    /// Centering constant `c` of the map body.
    ///
    /// The ground slab is centered on `body_origin`, so its footprint spans
    /// `[-c, w - c]` on X (same on Z) while the tiles span `[-0.5, w - 0.5]`.
    /// With the default of 1 the slab sits half a tile toward the origin from
    /// the tiles; 0.5 centers it on them. Obstacle boxes line up with their
    /// tiles for any `c`.
    pub centering: f32,
    /// Height of the ground plane.
    pub elevation: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            centering: 1.0,
            elevation: 0.0,
        }
    }
}

impl GridLayout {
    /// World position of a floor tile or obstacle instance: `(i, elevation, j)`.
    pub fn cell_position(&self, cell: CellCoord) -> Vec3 {
        Vec3::new(cell.i as f32, self.elevation, cell.j as f32)
    }

    /// World position of the compound map body.
    pub fn body_origin(&self, world: &GridWorld) -> Vec3 {
        let (half_w, half_h) = half_dims(world);
        Vec3::new(
            half_w - self.centering,
            self.elevation,
            half_h - self.centering,
        )
    }

    /// Offset of a cell's shape relative to [`Self::body_origin`].
    pub fn local_offset(&self, world: &GridWorld, cell: CellCoord) -> Vec3 {
        let (half_w, half_h) = half_dims(world);
        Vec3::new(
            cell.i as f32 - half_w + self.centering,
            0.0,
            cell.j as f32 - half_h + self.centering,
        )
    }

    /// Cell whose tile contains `position`, if any.
    pub fn cell_at(&self, world: &GridWorld, position: Vec3) -> Option<CellCoord> {
        let (x, z) = (position.x.round(), position.z.round());
        if !x.is_finite() || !z.is_finite() || x < 0.0 || z < 0.0 {
            return None;
        }
        let cell = CellCoord::new(x as usize, z as usize);
        world.contains(cell).then_some(cell)
    }

    /// Footprint of the whole grid in the XZ plane, as half-extents.
    pub fn half_footprint(&self, world: &GridWorld) -> (f32, f32) {
        half_dims(world)
    }
}

fn half_dims(world: &GridWorld) -> (f32, f32) {
    (world.width() as f32 / 2.0, world.height() as f32 / 2.0)
}
