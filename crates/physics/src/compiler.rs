use glam::Vec3;
use tiledrive_common::Pose;
use tiledrive_kernel::{CellCoord, GridLayout, GridWorld, ObstacleTypeId};

use crate::backend::{BodyDesc, BodyHandle, BoxShape, PhysicsBackend};
use crate::error::PhysicsError;

/// Half-height of the ground slab.
pub const GROUND_HALF_THICKNESS: f32 = 0.05;

/// Half-extents of the collision box placed on every obstacle cell.
pub const OBSTACLE_HALF_EXTENTS: Vec3 = Vec3::new(0.5, 1.0, 0.5);

/// Obstacle box together with the cell it was compiled from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleShape {
    pub cell: CellCoord,
    pub variant: ObstacleTypeId,
    pub shape: BoxShape,
}

/// The whole static map as one body: a ground slab plus one box per
/// obstacle cell, all sharing the body's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundBody {
    pub origin: Vec3,
    pub ground: BoxShape,
    pub obstacles: Vec<ObstacleShape>,
}

impl CompoundBody {
    /// Ground plus obstacles.
    pub fn shape_count(&self) -> usize {
        1 + self.obstacles.len()
    }

    /// Ground first, then obstacles in row-major order.
    pub fn shapes(&self) -> impl Iterator<Item = BoxShape> + '_ {
        std::iter::once(self.ground).chain(self.obstacles.iter().map(|o| o.shape))
    }

    /// World-space position of the base of an obstacle box.
    pub fn obstacle_base(&self, obstacle: &ObstacleShape) -> Vec3 {
        self.origin + obstacle.shape.offset - Vec3::Y * obstacle.shape.half_extents.y
    }

    /// Zero-mass body description for a physics backend.
    pub fn to_body_desc(&self) -> BodyDesc {
        BodyDesc::fixed(
            Pose::new(self.origin, glam::Quat::IDENTITY),
            self.shapes().collect(),
        )
    }
}

/// Compile a grid world into a single static compound body.
pub fn compile(world: &GridWorld, layout: &GridLayout) -> CompoundBody {
    let _span = tracing::debug_span!("compile_map", width = world.width(), height = world.height())
        .entered();

    let (half_w, half_h) = layout.half_footprint(world);
    let ground = BoxShape::new(
        Vec3::new(half_w, GROUND_HALF_THICKNESS, half_h),
        Vec3::ZERO,
    );

    let obstacles: Vec<ObstacleShape> = world
        .obstacle_cells()
        .map(|(cell, variant)| ObstacleShape {
            cell,
            variant,
            shape: BoxShape::new(
                OBSTACLE_HALF_EXTENTS,
                layout.local_offset(world, cell) + Vec3::Y * OBSTACLE_HALF_EXTENTS.y,
            ),
        })
        .collect();

    tracing::debug!(obstacles = obstacles.len(), "map compiled");
    CompoundBody {
        origin: layout.body_origin(world),
        ground,
        obstacles,
    }
}

/// Register a compiled map with a physics backend.
pub fn instantiate<P: PhysicsBackend + ?Sized>(
    physics: &mut P,
    body: &CompoundBody,
) -> Result<BodyHandle, PhysicsError> {
    let handle = physics.create_body(&body.to_body_desc())?;
    tracing::debug!(?handle, shapes = body.shape_count(), "map body created");
    Ok(handle)
}
