use tiledrive_common::Pose;
use tiledrive_input::InputSnapshot;
use tiledrive_kernel::{GridLayout, GridWorld};
use tiledrive_physics::{BodyHandle, PhysicsBackend, compile, instantiate};
use tiledrive_render::{NodeId, RenderBackend, attach, project};
use tiledrive_vehicle::{DrivableEntity, MotionController};

use crate::config::{SceneAssets, SceneConfig};
use crate::error::SceneError;

/// A running scene: backends, static map and vehicle.
///
/// There is no global state. Whoever drives the frame loop owns the scene
/// and calls [`Scene::frame`] once per simulation step.
pub struct Scene<P: PhysicsBackend, R: RenderBackend> {
    physics: P,
    render: R,
    world: GridWorld,
    layout: GridLayout,
    ground: BodyHandle,
    map_nodes: Vec<NodeId>,
    vehicle: DrivableEntity,
    vehicle_node: NodeId,
    controller: MotionController,
    frames: u64,
}

impl<P: PhysicsBackend, R: RenderBackend> Scene<P, R> {
    /// Build the scene: project the map, compile and register the ground
    /// body, attach the map nodes, then spawn the vehicle.
    ///
    /// Projection runs first, so a map referencing unknown floor types or
    /// obstacle variants is rejected before either backend is touched.
    pub fn build(
        world: GridWorld,
        assets: &SceneAssets,
        config: &SceneConfig,
        mut physics: P,
        mut render: R,
    ) -> Result<Self, SceneError> {
        let _span = tracing::debug_span!("build_scene", width = world.width(), height = world.height())
            .entered();
        let layout = config.layout;

        let primitives = project(&world, &layout, &assets.palette, &assets.variants)?;
        let ground = instantiate(&mut physics, &compile(&world, &layout))?;
        let map_nodes = attach(&mut render, &primitives);

        let vehicle = DrivableEntity::spawn(&mut physics, &config.vehicle, config.spawn.pose())?;
        let mut model = assets.vehicle.instantiate();
        model.set_cast_shadow(true);
        let vehicle_node = render.add_model(&model, vehicle.visual_transform());

        tracing::info!(
            bodies = physics.body_count(),
            nodes = render.node_count(),
            obstacles = world.obstacle_count(),
            "scene built"
        );
        Ok(Self {
            physics,
            render,
            world,
            layout,
            ground,
            map_nodes,
            vehicle,
            vehicle_node,
            controller: MotionController::new(config.bindings),
            frames: 0,
        })
    }

    /// Advance one frame: drive forces, physics step, pose sync, then the
    /// vehicle node's transform.
    pub fn frame(&mut self, input: &InputSnapshot, dt: f32) {
        let _span = tracing::trace_span!("frame", n = self.frames).entered();
        self.controller
            .step(&self.vehicle, &mut self.physics, input, dt);
        self.physics.step(dt);
        self.controller.sync_pose(&mut self.vehicle, &self.physics);
        self.render
            .set_transform(self.vehicle_node, self.vehicle.visual_transform());
        self.frames += 1;
    }

    /// Remove the vehicle, the map body and every node, and hand the
    /// backends back.
    pub fn teardown(mut self) -> Result<(P, R), SceneError> {
        self.render.remove(self.vehicle_node);
        for node in self.map_nodes.drain(..) {
            self.render.remove(node);
        }
        self.vehicle.despawn(&mut self.physics)?;
        self.physics.remove_body(self.ground)?;
        tracing::debug!(frames = self.frames, "scene torn down");
        Ok((self.physics, self.render))
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn render(&self) -> &R {
        &self.render
    }

    pub fn render_mut(&mut self) -> &mut R {
        &mut self.render
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    pub fn map_nodes(&self) -> &[NodeId] {
        &self.map_nodes
    }

    pub fn vehicle(&self) -> &DrivableEntity {
        &self.vehicle
    }

    pub fn vehicle_node(&self) -> NodeId {
        self.vehicle_node
    }

    /// Simulated pose of the vehicle body.
    pub fn vehicle_pose(&self) -> Option<Pose> {
        self.physics.pose(self.vehicle.body())
    }

    pub fn controller(&self) -> &MotionController {
        &self.controller
    }

    /// Frames run so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use tiledrive_assets::{AssetHandle, AssetId, AssetVariants, FloorPalette, MeshNode};
    use tiledrive_common::Color;
    use tiledrive_input::KeyCode;
    use tiledrive_physics::RapierBackend;
    use tiledrive_render::{DebugSceneRenderer, ProjectionError, SceneNodeKind};

    fn assets() -> SceneAssets {
        SceneAssets {
            palette: FloorPalette::new(vec![Color::WHITE, Color::GRAY]),
            variants: AssetVariants::new(vec![AssetHandle::new(
                AssetId(1),
                "tree",
                vec![MeshNode::unit("trunk", Color::GRAY)],
            )]),
            vehicle: AssetHandle::new(AssetId(2), "car", vec![MeshNode::unit("body", Color::WHITE)]),
        }
    }

    fn world() -> GridWorld {
        let mut obstacles = vec![vec![0; 4]; 4];
        obstacles[3][3] = 1;
        GridWorld::new(vec![vec![0; 4]; 4], obstacles).unwrap()
    }

    fn build() -> Scene<RapierBackend, DebugSceneRenderer> {
        Scene::build(
            world(),
            &assets(),
            &SceneConfig::default(),
            RapierBackend::default(),
            DebugSceneRenderer::new(),
        )
        .unwrap()
    }

    #[test]
    fn build_attaches_map_and_vehicle() {
        let scene = build();
        // 16 tiles + 1 obstacle + vehicle
        assert_eq!(scene.render().node_count(), 18);
        assert_eq!(scene.map_nodes().len(), 17);
        assert_eq!(scene.physics().body_count(), 2);
        assert_eq!(scene.physics().shape_count(scene.ground()), Some(2));

        let car = scene.render().node(scene.vehicle_node()).unwrap();
        assert!(matches!(&car.kind, SceneNodeKind::Model { asset, .. } if asset == "car"));
        assert!(car.cast_shadow);
    }

    #[test]
    fn unknown_variant_fails_before_backends_are_used() {
        let mut obstacles = vec![vec![0; 2]; 2];
        obstacles[0][1] = 5;
        let world = GridWorld::new(vec![vec![0; 2]; 2], obstacles).unwrap();
        let result = Scene::build(
            world,
            &assets(),
            &SceneConfig::default(),
            RapierBackend::default(),
            DebugSceneRenderer::new(),
        );
        assert!(matches!(
            result,
            Err(SceneError::Projection(ProjectionError::UnknownAssetVariant { variant: 5, .. }))
        ));
    }

    #[test]
    fn frame_updates_vehicle_node_from_physics() {
        let mut scene = build();
        let input = InputSnapshot::from_pressed([KeyCode::W]);
        for _ in 0..30 {
            scene.frame(&input, 1.0 / 60.0);
        }
        assert_eq!(scene.frame_count(), 30);

        let pose = scene.vehicle_pose().unwrap();
        assert!(pose.position.z > SceneConfig::default().spawn.position.z);

        let node = scene.render().node(scene.vehicle_node()).unwrap();
        assert_eq!(node.transform, scene.vehicle().visual_transform());
        assert!(
            node.transform
                .position
                .abs_diff_eq(pose.position + Vec3::Y * -0.25, 1e-5)
        );
    }

    #[test]
    fn teardown_empties_both_backends() {
        let mut scene = build();
        scene.frame(&InputSnapshot::empty(), 1.0 / 60.0);
        let (physics, render) = scene.teardown().unwrap();
        assert_eq!(physics.body_count(), 0);
        assert_eq!(render.node_count(), 0);
    }
}
