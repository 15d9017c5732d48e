use glam::Vec3;
use serde::{Deserialize, Serialize};
use tiledrive_common::{Pose, Transform};
use tiledrive_physics::{BodyDesc, BodyHandle, BoxShape, PhysicsBackend, PhysicsError};

/// Body-local axis that "forward" pushes along.
pub const LOCAL_FORWARD: Vec3 = Vec3::Z;

/// Tuning for the drivable vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub mass: f32,
    pub half_extents: Vec3,
    /// Force applied while forward/backward is held.
    pub move_force: f32,
    /// Torque applied while left/right is held.
    pub turn_torque: f32,
    /// Vertical offset from the body center to the model origin.
    pub visual_offset: f32,
    /// Per-axis linear motion factor; (1, 0, 1) keeps the car on the ground plane.
    pub linear_factor: Vec3,
    /// Per-axis angular motion factor; (0, 1, 0) allows yaw only.
    pub angular_factor: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            half_extents: Vec3::new(0.5, 0.25, 1.0),
            move_force: 10.0,
            turn_torque: 2.0,
            visual_offset: -0.25,
            linear_factor: Vec3::new(1.0, 0.0, 1.0),
            angular_factor: Vec3::Y,
            linear_damping: 0.5,
            angular_damping: 2.0,
        }
    }
}

impl DriveConfig {
    /// Body description for a vehicle spawned at `pose`.
    pub fn body_desc(&self, pose: Pose) -> BodyDesc {
        let mut desc = BodyDesc::dynamic(
            self.mass,
            pose,
            vec![BoxShape::new(self.half_extents, Vec3::ZERO)],
        );
        desc.linear_factor = self.linear_factor;
        desc.angular_factor = self.angular_factor;
        desc.linear_damping = self.linear_damping;
        desc.angular_damping = self.angular_damping;
        desc
    }
}

/// A vehicle: one rigid body plus the transform the renderer draws.
#[derive(Debug, Clone, PartialEq)]
pub struct DrivableEntity {
    body: BodyHandle,
    visual: Transform,
    move_force: f32,
    turn_torque: f32,
    visual_offset: f32,
}

impl DrivableEntity {
    /// Create the vehicle's body at `pose`.
    ///
    /// The visual transform starts at the same pose, offset like every later
    /// sync.
    pub fn spawn<P: PhysicsBackend + ?Sized>(
        physics: &mut P,
        config: &DriveConfig,
        pose: Pose,
    ) -> Result<Self, PhysicsError> {
        if !(config.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(config.mass));
        }
        let body = physics.create_body(&config.body_desc(pose))?;
        tracing::debug!(?body, position = %pose.position, "vehicle spawned");
        Ok(Self {
            body,
            visual: visual_transform(pose, config.visual_offset),
            move_force: config.move_force,
            turn_torque: config.turn_torque,
            visual_offset: config.visual_offset,
        })
    }

    /// Remove the vehicle's body.
    pub fn despawn<P: PhysicsBackend + ?Sized>(self, physics: &mut P) -> Result<(), PhysicsError> {
        physics.remove_body(self.body)
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn visual_transform(&self) -> Transform {
        self.visual
    }

    pub fn move_force(&self) -> f32 {
        self.move_force
    }

    pub fn turn_torque(&self) -> f32 {
        self.turn_torque
    }

    pub fn visual_offset(&self) -> f32 {
        self.visual_offset
    }

    pub(crate) fn set_visual_from(&mut self, pose: Pose) {
        self.visual = visual_transform(pose, self.visual_offset);
    }
}

fn visual_transform(pose: Pose, offset: f32) -> Transform {
    Transform {
        position: pose.position + Vec3::Y * offset,
        rotation: pose.rotation,
        scale: Vec3::ONE,
    }
}
