use glam::Vec3;
use tiledrive_assets::{AssetHandle, AssetVariants, FloorPalette};
use tiledrive_common::Color;
use tiledrive_kernel::{CellCoord, FloorTypeId, GridLayout, GridWorld, ObstacleTypeId};

/// Map configuration problems found while projecting.
#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("cell {cell} uses obstacle variant {variant}, but only {available} variants are loaded")]
    UnknownAssetVariant {
        cell: CellCoord,
        variant: ObstacleTypeId,
        available: usize,
    },
    #[error("cell {cell} uses floor type {floor}, but the palette has {palette_size} colors")]
    UnknownFloorType {
        cell: CellCoord,
        floor: FloorTypeId,
        palette_size: usize,
    },
}

/// Flat floor tile. Tiles receive shadows.
#[derive(Debug, Clone, PartialEq)]
pub struct TilePrimitive {
    pub cell: CellCoord,
    pub position: Vec3,
    pub color: Color,
    pub receive_shadow: bool,
}

/// Independent copy of an obstacle model placed on a cell.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetInstance {
    pub cell: CellCoord,
    pub position: Vec3,
    pub asset: AssetHandle,
}

/// One renderable item produced by [`project`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedPrimitive {
    Tile(TilePrimitive),
    Instance(AssetInstance),
}

impl PlacedPrimitive {
    pub fn cell(&self) -> CellCoord {
        match self {
            Self::Tile(t) => t.cell,
            Self::Instance(i) => i.cell,
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            Self::Tile(t) => t.position,
            Self::Instance(i) => i.position,
        }
    }
}

/// Project a grid world into renderable primitives.
///
/// For every cell in row-major order: the floor tile, then the obstacle
/// instance if the cell has one. Unknown floor types or obstacle variants
/// are reported, never skipped.
pub fn project(
    world: &GridWorld,
    layout: &GridLayout,
    palette: &FloorPalette,
    variants: &AssetVariants,
) -> Result<Vec<PlacedPrimitive>, ProjectionError> {
    let _span = tracing::debug_span!("project_map", width = world.width(), height = world.height())
        .entered();

    let mut out = Vec::with_capacity(world.width() * world.height() + world.obstacle_count());
    for cell in world.cells() {
        let position = layout.cell_position(cell);

        let floor = world.floor_at(cell).unwrap_or_default();
        let color = palette
            .get(floor)
            .ok_or(ProjectionError::UnknownFloorType {
                cell,
                floor,
                palette_size: palette.len(),
            })?;
        out.push(PlacedPrimitive::Tile(TilePrimitive {
            cell,
            position,
            color,
            receive_shadow: true,
        }));

        let variant = world.obstacle_at(cell).unwrap_or_default();
        if variant == 0 {
            continue;
        }
        let source = variants
            .resolve(variant)
            .ok_or(ProjectionError::UnknownAssetVariant {
                cell,
                variant,
                available: variants.len(),
            })?;
        let mut asset = source.instantiate();
        asset.set_cast_shadow(true);
        out.push(PlacedPrimitive::Instance(AssetInstance {
            cell,
            position,
            asset,
        }));
    }

    tracing::debug!(primitives = out.len(), "map projected");
    Ok(out)
}
