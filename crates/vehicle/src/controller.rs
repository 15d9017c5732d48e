use glam::Vec3;
use tiledrive_input::{DriveIntent, InputSnapshot, KeyBindings};
use tiledrive_physics::PhysicsBackend;

use crate::entity::{DrivableEntity, LOCAL_FORWARD};

/// Turns held keys into forces on a [`DrivableEntity`] and keeps its visual
/// transform in step with the simulated body.
#[derive(Debug, Clone, Default)]
pub struct MotionController {
    bindings: KeyBindings,
}

impl MotionController {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Body-local force and world-space torque for `intent`.
    ///
    /// Opposing inputs have already cancelled inside the intent, so a
    /// cancelled axis yields exactly zero.
    pub fn drive_forces(&self, entity: &DrivableEntity, intent: DriveIntent) -> (Vec3, Vec3) {
        let force = LOCAL_FORWARD * (entity.move_force() * intent.throttle);
        let torque = Vec3::Y * (entity.turn_torque() * intent.steer);
        (force, torque)
    }

    /// Apply this frame's drive forces. Call once per frame before stepping
    /// the physics world.
    ///
    /// Magnitudes do not depend on `dt`; the physics step integrates them.
    pub fn step<P: PhysicsBackend + ?Sized>(
        &self,
        entity: &DrivableEntity,
        physics: &mut P,
        input: &InputSnapshot,
        dt: f32,
    ) {
        let intent = DriveIntent::from_snapshot(input, &self.bindings);
        if intent.is_idle() {
            return;
        }
        let (force, torque) = self.drive_forces(entity, intent);
        tracing::trace!(
            throttle = intent.throttle,
            steer = intent.steer,
            dt,
            "drive"
        );
        if force != Vec3::ZERO {
            physics.apply_local_force(entity.body(), force);
        }
        if torque != Vec3::ZERO {
            physics.apply_torque(entity.body(), torque);
        }
    }

    /// Copy the body's pose onto the entity's visual transform. Call after
    /// the physics step.
    pub fn sync_pose<P: PhysicsBackend + ?Sized>(&self, entity: &mut DrivableEntity, physics: &P) {
        match physics.pose(entity.body()) {
            Some(pose) => entity.set_visual_from(pose),
            None => tracing::warn!(body = ?entity.body(), "vehicle body missing, pose not synced"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::DriveConfig;
    use crate::testing::RecordingPhysics;
    use glam::Quat;
    use tiledrive_common::Pose;
    use tiledrive_input::KeyCode;

    fn spawn() -> (RecordingPhysics, DrivableEntity) {
        let mut physics = RecordingPhysics::default();
        let car = DrivableEntity::spawn(&mut physics, &DriveConfig::default(), Pose::default())
            .unwrap();
        (physics, car)
    }

    fn keys(pressed: &[KeyCode]) -> InputSnapshot {
        InputSnapshot::from_pressed(pressed.iter().copied())
    }

    #[test]
    fn no_input_applies_nothing() {
        let (mut physics, car) = spawn();
        MotionController::default().step(&car, &mut physics, &InputSnapshot::empty(), 1.0 / 60.0);
        assert!(physics.forces.is_empty());
        assert!(physics.torques.is_empty());
    }

    #[test]
    fn forward_pushes_along_local_forward() {
        let (mut physics, car) = spawn();
        MotionController::default().step(&car, &mut physics, &keys(&[KeyCode::W]), 1.0 / 60.0);
        assert_eq!(physics.net_force(), Vec3::new(0.0, 0.0, 10.0));
        assert!(physics.torques.is_empty());
    }

    #[test]
    fn backward_is_negative_forward() {
        let (mut physics, car) = spawn();
        MotionController::default().step(&car, &mut physics, &keys(&[KeyCode::S]), 1.0 / 60.0);
        assert_eq!(physics.net_force(), Vec3::new(0.0, 0.0, -10.0));
    }

    #[test]
    fn opposing_keys_cancel() {
        let (mut physics, car) = spawn();
        let all = keys(&[KeyCode::W, KeyCode::S, KeyCode::A, KeyCode::D]);
        MotionController::default().step(&car, &mut physics, &all, 1.0 / 60.0);
        assert_eq!(physics.net_force(), Vec3::ZERO);
        assert_eq!(physics.net_torque(), Vec3::ZERO);
    }

    #[test]
    fn left_torque_is_constant_regardless_of_dt() {
        let controller = MotionController::default();
        let mut torques = Vec::new();
        for dt in [1.0 / 240.0, 1.0 / 60.0, 0.1] {
            let (mut physics, car) = spawn();
            controller.step(&car, &mut physics, &keys(&[KeyCode::A]), dt);
            torques.push(physics.net_torque());
        }
        assert!(torques.iter().all(|t| *t == Vec3::new(0.0, 2.0, 0.0)));
    }

    #[test]
    fn right_torque_yaws_negative() {
        let (mut physics, car) = spawn();
        MotionController::default().step(&car, &mut physics, &keys(&[KeyCode::D]), 1.0 / 60.0);
        assert_eq!(physics.net_torque(), Vec3::new(0.0, -2.0, 0.0));
    }

    #[test]
    fn custom_bindings_are_honored() {
        let (mut physics, car) = spawn();
        let controller = MotionController::new(KeyBindings {
            forward: KeyCode::ARROW_UP,
            backward: KeyCode::ARROW_DOWN,
            left: KeyCode::ARROW_LEFT,
            right: KeyCode::ARROW_RIGHT,
        });
        controller.step(&car, &mut physics, &keys(&[KeyCode::W]), 1.0 / 60.0);
        assert!(physics.forces.is_empty());
        controller.step(&car, &mut physics, &keys(&[KeyCode::ARROW_UP]), 1.0 / 60.0);
        assert_eq!(physics.net_force(), Vec3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn sync_applies_offset_to_position_only() {
        let (mut physics, mut car) = spawn();
        let rotation = Quat::from_rotation_y(0.7);
        physics.set_pose(car.body(), Pose::new(Vec3::new(3.0, 1.0, -2.0), rotation));

        let controller = MotionController::default();
        controller.sync_pose(&mut car, &physics);
        let visual = car.visual_transform();
        assert_eq!(visual.position, Vec3::new(3.0, 0.75, -2.0));
        assert_eq!(visual.rotation, rotation);
    }

    #[test]
    fn sync_is_idempotent() {
        let (mut physics, mut car) = spawn();
        physics.set_pose(car.body(), Pose::new(Vec3::new(1.0, 0.5, 1.0), Quat::IDENTITY));
        let controller = MotionController::default();
        controller.sync_pose(&mut car, &physics);
        let first = car.visual_transform();
        controller.sync_pose(&mut car, &physics);
        assert_eq!(car.visual_transform(), first);
    }

    #[test]
    fn sync_without_body_keeps_transform() {
        let (mut physics, mut car) = spawn();
        let before = car.visual_transform();
        physics.bodies.clear();
        MotionController::default().sync_pose(&mut car, &physics);
        assert_eq!(car.visual_transform(), before);
    }
}
