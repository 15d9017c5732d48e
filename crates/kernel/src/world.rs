use serde::{Deserialize, Serialize};
use std::path::Path;

/// Index into the floor palette.
pub type FloorTypeId = u16;

/// Obstacle code: 0 is an empty cell, `n > 0` selects asset variant `n - 1`.
pub type ObstacleTypeId = u16;

/// One `(i, j)` address in the map grids.
///
/// `i` runs along world X (`0..width`), `j` along world Z (`0..height`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub i: usize,
    pub j: usize,
}

impl CellCoord {
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl std::fmt::Display for CellCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.i, self.j)
    }
}

/// Errors raised while building or loading a grid world.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("grid world must have at least one row and one column")]
    Empty,
    #[error("{grid} grid row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        grid: &'static str,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("floor grid is {floor:?} but obstacle grid is {obstacles:?} (width, height)")]
    DimensionMismatch {
        floor: (usize, usize),
        obstacles: (usize, usize),
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("map JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk map representation: two literal integer grids.
///
/// The outer array is indexed by `i`, the inner arrays by `j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDefinition {
    pub floor: Vec<Vec<FloorTypeId>>,
    pub obstacles: Vec<Vec<ObstacleTypeId>>,
}

/// Immutable rectangular tile map: a floor-type grid and an obstacle grid of
/// equal dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MapDefinition", into = "MapDefinition")]
pub struct GridWorld {
    width: usize,
    height: usize,
    floor: Vec<Vec<FloorTypeId>>,
    obstacles: Vec<Vec<ObstacleTypeId>>,
}

impl GridWorld {
    /// Validate and build a world. Ragged or mismatched grids are rejected,
    /// never clipped or padded.
    pub fn new(
        floor: Vec<Vec<FloorTypeId>>,
        obstacles: Vec<Vec<ObstacleTypeId>>,
    ) -> Result<Self, GridError> {
        let floor_dims = rect_dims("floor", &floor)?;
        let obstacle_dims = rect_dims("obstacle", &obstacles)?;
        if floor_dims != obstacle_dims {
            return Err(GridError::DimensionMismatch {
                floor: floor_dims,
                obstacles: obstacle_dims,
            });
        }
        let (width, height) = floor_dims;
        tracing::debug!(width, height, "grid world validated");
        Ok(Self {
            width,
            height,
            floor,
            obstacles,
        })
    }

    /// Parse a map definition from JSON and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, GridError> {
        let def: MapDefinition = serde_json::from_str(json)?;
        Self::try_from(def)
    }

    /// Load a map definition file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, GridError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.i < self.width && cell.j < self.height
    }

    pub fn floor_at(&self, cell: CellCoord) -> Option<FloorTypeId> {
        self.floor.get(cell.i)?.get(cell.j).copied()
    }

    pub fn obstacle_at(&self, cell: CellCoord) -> Option<ObstacleTypeId> {
        self.obstacles.get(cell.i)?.get(cell.j).copied()
    }

    /// All cells in row-major order (`i` outer, `j` inner).
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.width).flat_map(move |i| (0..self.height).map(move |j| CellCoord::new(i, j)))
    }

    /// Cells holding an obstacle, with their variant code, in row-major order.
    pub fn obstacle_cells(&self) -> impl Iterator<Item = (CellCoord, ObstacleTypeId)> + '_ {
        self.obstacles.iter().enumerate().flat_map(|(i, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, v)| **v > 0)
                .map(move |(j, v)| (CellCoord::new(i, j), *v))
        })
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacle_cells().count()
    }

    /// Largest floor type used anywhere in the map.
    pub fn max_floor_type(&self) -> FloorTypeId {
        self.floor.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Largest obstacle variant used anywhere in the map (0 if none).
    pub fn max_obstacle_variant(&self) -> ObstacleTypeId {
        self.obstacles.iter().flatten().copied().max().unwrap_or(0)
    }
}

impl TryFrom<MapDefinition> for GridWorld {
    type Error = GridError;

    fn try_from(def: MapDefinition) -> Result<Self, Self::Error> {
        Self::new(def.floor, def.obstacles)
    }
}

impl From<GridWorld> for MapDefinition {
    fn from(world: GridWorld) -> Self {
        Self {
            floor: world.floor,
            obstacles: world.obstacles,
        }
    }
}

fn rect_dims<T>(grid: &'static str, rows: &[Vec<T>]) -> Result<(usize, usize), GridError> {
    let expected = rows.first().map(Vec::len).ok_or(GridError::Empty)?;
    if expected == 0 {
        return Err(GridError::Empty);
    }
    for (row, cells) in rows.iter().enumerate() {
        if cells.len() != expected {
            return Err(GridError::RaggedRow {
                grid,
                row,
                expected,
                found: cells.len(),
            });
        }
    }
    Ok((rows.len(), expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(w: usize, h: usize) -> Vec<Vec<u16>> {
        vec![vec![0; h]; w]
    }

    #[test]
    fn builds_square_world() {
        let world = GridWorld::new(zeros(3, 3), zeros(3, 3)).unwrap();
        assert_eq!(world.width(), 3);
        assert_eq!(world.height(), 3);
        assert_eq!(world.obstacle_count(), 0);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let err = GridWorld::new(zeros(3, 3), zeros(3, 2)).unwrap_err();
        assert!(matches!(
            err,
            GridError::DimensionMismatch {
                floor: (3, 3),
                obstacles: (3, 2)
            }
        ));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let floor = vec![vec![0, 0, 0], vec![0, 0], vec![0, 0, 0]];
        let err = GridWorld::new(floor, zeros(3, 3)).unwrap_err();
        assert!(matches!(
            err,
            GridError::RaggedRow {
                grid: "floor",
                row: 1,
                expected: 3,
                found: 2
            }
        ));
    }

    #[test]
    fn empty_grids_are_rejected() {
        assert!(matches!(
            GridWorld::new(vec![], vec![]),
            Err(GridError::Empty)
        ));
        assert!(matches!(
            GridWorld::new(vec![vec![]], vec![vec![]]),
            Err(GridError::Empty)
        ));
    }

    #[test]
    fn cells_are_row_major() {
        let world = GridWorld::new(zeros(2, 3), zeros(2, 3)).unwrap();
        let cells: Vec<CellCoord> = world.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], CellCoord::new(0, 0));
        assert_eq!(cells[1], CellCoord::new(0, 1));
        assert_eq!(cells[3], CellCoord::new(1, 0));
        let mut sorted = cells.clone();
        sorted.sort();
        assert_eq!(cells, sorted);
    }

    #[test]
    fn obstacle_cells_skip_empty() {
        let mut obstacles = zeros(3, 3);
        obstacles[1][1] = 1;
        obstacles[2][0] = 3;
        let world = GridWorld::new(zeros(3, 3), obstacles).unwrap();
        let found: Vec<_> = world.obstacle_cells().collect();
        assert_eq!(
            found,
            vec![(CellCoord::new(1, 1), 1), (CellCoord::new(2, 0), 3)]
        );
        assert_eq!(world.max_obstacle_variant(), 3);
        assert_eq!(world.obstacle_at(CellCoord::new(1, 1)), Some(1));
        assert_eq!(world.obstacle_at(CellCoord::new(5, 5)), None);
    }

    #[test]
    fn json_round_trip_validates() {
        let json = r#"{"floor": [[0, 1], [1, 0]], "obstacles": [[0, 0], [2, 0]]}"#;
        let world = GridWorld::from_json_str(json).unwrap();
        assert_eq!(world.floor_at(CellCoord::new(0, 1)), Some(1));
        assert_eq!(world.max_floor_type(), 1);

        let bad = r#"{"floor": [[0, 1], [1, 0]], "obstacles": [[0, 0]]}"#;
        assert!(matches!(
            GridWorld::from_json_str(bad),
            Err(GridError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            r#"{"floor": [[0, 0, 0]], "obstacles": [[0, 1, 0]]}"#,
        )
        .unwrap();
        let world = GridWorld::load(tmp.path()).unwrap();
        assert_eq!(world.width(), 1);
        assert_eq!(world.height(), 3);
        assert_eq!(world.obstacle_count(), 1);
    }
}
