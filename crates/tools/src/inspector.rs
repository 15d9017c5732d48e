use std::collections::BTreeSet;

use glam::Vec3;
use tiledrive_kernel::{CellCoord, GridWorld};
use tiledrive_physics::PhysicsBackend;
use tiledrive_render::RenderBackend;
use tiledrive_scene::Scene;

/// Scene inspector for developer tooling.
///
/// Read-only queries for the desktop HUD and the CLI.
pub struct SceneInspector;

impl SceneInspector {
    /// Summarize a map without building a scene.
    pub fn map_summary(world: &GridWorld) -> MapSummary {
        let floor_types: BTreeSet<u16> = world
            .cells()
            .filter_map(|cell| world.floor_at(cell))
            .collect();
        MapSummary {
            width: world.width(),
            height: world.height(),
            obstacles: world.obstacle_count(),
            floor_types: floor_types.len(),
            max_floor_type: world.max_floor_type(),
            max_obstacle_variant: world.max_obstacle_variant(),
        }
    }

    pub fn summary<P: PhysicsBackend, R: RenderBackend>(scene: &Scene<P, R>) -> SceneSummary {
        SceneSummary {
            frame: scene.frame_count(),
            map: Self::map_summary(scene.world()),
            bodies: scene.physics().body_count(),
            ground_shapes: scene.physics().shape_count(scene.ground()).unwrap_or(0),
            nodes: scene.render().node_count(),
            vehicle: Self::inspect_vehicle(scene),
        }
    }

    /// Where the vehicle is and which cell it is over.
    pub fn inspect_vehicle<P: PhysicsBackend, R: RenderBackend>(
        scene: &Scene<P, R>,
    ) -> Option<VehicleInfo> {
        scene.vehicle_pose().map(|pose| VehicleInfo {
            position: pose.position,
            heading_degrees: pose.yaw().to_degrees(),
            cell: scene.layout().cell_at(scene.world(), pose.position),
        })
    }
}

/// Map statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSummary {
    pub width: usize,
    pub height: usize,
    pub obstacles: usize,
    /// Distinct floor types in use.
    pub floor_types: usize,
    pub max_floor_type: u16,
    pub max_obstacle_variant: u16,
}

impl std::fmt::Display for MapSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Map: {}x{} obstacles={} floor_types={} max_floor={} max_variant={}",
            self.width,
            self.height,
            self.obstacles,
            self.floor_types,
            self.max_floor_type,
            self.max_obstacle_variant
        )
    }
}

/// Vehicle state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleInfo {
    pub position: Vec3,
    pub heading_degrees: f32,
    /// `None` once the vehicle has left the map.
    pub cell: Option<CellCoord>,
}

impl std::fmt::Display for VehicleInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.position;
        write!(
            f,
            "Vehicle pos=({:.2}, {:.2}, {:.2}) heading={:.1}deg",
            p.x, p.y, p.z, self.heading_degrees
        )?;
        match self.cell {
            Some(cell) => write!(f, " cell={cell}"),
            None => write!(f, " off-map"),
        }
    }
}

/// Summary of a running scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub frame: u64,
    pub map: MapSummary,
    pub bodies: usize,
    pub ground_shapes: usize,
    pub nodes: usize,
    pub vehicle: Option<VehicleInfo>,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Scene: frame={} bodies={} ground_shapes={} nodes={}",
            self.frame, self.bodies, self.ground_shapes, self.nodes
        )?;
        write!(f, "{}", self.map)?;
        if let Some(vehicle) = &self.vehicle {
            write!(f, "\n{vehicle}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiledrive_assets::{AssetHandle, AssetId, AssetVariants, FloorPalette, MeshNode};
    use tiledrive_common::Color;
    use tiledrive_input::InputSnapshot;
    use tiledrive_physics::RapierBackend;
    use tiledrive_render::DebugSceneRenderer;
    use tiledrive_scene::{SceneAssets, SceneConfig};

    fn world() -> GridWorld {
        let floor = vec![vec![0, 1, 1], vec![0, 0, 2], vec![0, 0, 0], vec![1, 1, 1]];
        let mut obstacles = vec![vec![0; 3]; 4];
        obstacles[3][0] = 2;
        GridWorld::new(floor, obstacles).unwrap()
    }

    fn scene() -> Scene<RapierBackend, DebugSceneRenderer> {
        let unit = |name: &str| vec![MeshNode::unit(name, Color::GRAY)];
        let assets = SceneAssets {
            palette: FloorPalette::new(vec![Color::WHITE, Color::GRAY, Color::rgb(0.2, 0.5, 0.2)]),
            variants: AssetVariants::new(vec![
                AssetHandle::new(AssetId(1), "tree", unit("crown")),
                AssetHandle::new(AssetId(2), "rock", unit("stone")),
            ]),
            vehicle: AssetHandle::new(AssetId(3), "car", unit("body")),
        };
        Scene::build(
            world(),
            &assets,
            &SceneConfig::default(),
            RapierBackend::default(),
            DebugSceneRenderer::new(),
        )
        .unwrap()
    }

    #[test]
    fn map_summary_counts() {
        let summary = SceneInspector::map_summary(&world());
        assert_eq!((summary.width, summary.height), (4, 3));
        assert_eq!(summary.obstacles, 1);
        assert_eq!(summary.floor_types, 3);
        assert_eq!(summary.max_floor_type, 2);
        assert_eq!(summary.max_obstacle_variant, 2);
        assert!(summary.to_string().contains("4x3"));
    }

    #[test]
    fn scene_summary_reports_backends() {
        let mut scene = scene();
        scene.frame(&InputSnapshot::empty(), 1.0 / 60.0);
        let summary = SceneInspector::summary(&scene);
        assert_eq!(summary.frame, 1);
        assert_eq!(summary.bodies, 2);
        assert_eq!(summary.ground_shapes, 2);
        assert_eq!(summary.nodes, 4 * 3 + 1 + 1);
        assert!(summary.to_string().contains("frame=1"));
    }

    #[test]
    fn vehicle_cell_follows_spawn() {
        let scene = scene();
        let info = SceneInspector::inspect_vehicle(&scene).unwrap();
        assert_eq!(info.cell, Some(CellCoord::new(1, 1)));
        assert!(info.heading_degrees.abs() < 1e-3);
        assert!(info.to_string().contains("cell="));
    }
}
