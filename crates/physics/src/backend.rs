use glam::Vec3;
use serde::{Deserialize, Serialize};
use tiledrive_common::Pose;

use crate::error::PhysicsError;

/// Opaque handle to a body owned by a [`PhysicsBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u32);

/// Box collision shape attached to a body at a local offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShape {
    pub half_extents: Vec3,
    pub offset: Vec3,
}

impl BoxShape {
    pub fn new(half_extents: Vec3, offset: Vec3) -> Self {
        Self {
            half_extents,
            offset,
        }
    }

    pub fn volume(&self) -> f32 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }
}

/// Engine-independent description of a rigid body.
///
/// A mass of zero makes the body static. The per-axis factors scale the
/// velocity change each step produces along world axes: 1 is free motion,
/// 0 locks the axis and values in between damp the response.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub mass: f32,
    pub pose: Pose,
    pub shapes: Vec<BoxShape>,
    pub linear_factor: Vec3,
    pub angular_factor: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
}

impl BodyDesc {
    /// Zero-mass body at `pose`.
    pub fn fixed(pose: Pose, shapes: Vec<BoxShape>) -> Self {
        Self::dynamic(0.0, pose, shapes)
    }

    /// Body of the given mass with unconstrained motion and no damping.
    pub fn dynamic(mass: f32, pose: Pose, shapes: Vec<BoxShape>) -> Self {
        Self {
            mass,
            pose,
            shapes,
            linear_factor: Vec3::ONE,
            angular_factor: Vec3::ONE,
            linear_damping: 0.0,
            angular_damping: 0.0,
        }
    }

    pub fn is_static(&self) -> bool {
        self.mass == 0.0
    }

    /// Check the description before any backend sees it.
    pub fn validate(&self) -> Result<(), PhysicsError> {
        if !self.mass.is_finite() || self.mass < 0.0 {
            return Err(PhysicsError::InvalidMass(self.mass));
        }
        for factor in [self.linear_factor, self.angular_factor] {
            if !factor.is_finite() || factor.cmplt(Vec3::ZERO).any() {
                return Err(PhysicsError::InvalidFactor(factor.to_array()));
            }
        }
        if self.shapes.is_empty() {
            return Err(PhysicsError::NoShapes);
        }
        for shape in &self.shapes {
            if shape.half_extents.cmple(Vec3::ZERO).any() {
                return Err(PhysicsError::InvalidHalfExtents(
                    shape.half_extents.to_array(),
                ));
            }
        }
        Ok(())
    }
}

/// Rigid-body simulator capability.
///
/// The grid compiler, the vehicle and the scene depend only on this trait.
/// Force application never fails: an unknown handle is logged and ignored.
pub trait PhysicsBackend {
    /// Create a body from a description.
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError>;

    /// Remove a body and every shape attached to it.
    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError>;

    /// Add a force along the body's local axes for the next step.
    fn apply_local_force(&mut self, body: BodyHandle, force: Vec3);

    /// Add a world-frame torque for the next step.
    fn apply_torque(&mut self, body: BodyHandle, torque: Vec3);

    /// Current simulated pose.
    fn pose(&self, body: BodyHandle) -> Option<Pose>;

    /// Number of collision shapes attached to a body.
    fn shape_count(&self, body: BodyHandle) -> Option<usize>;

    /// Number of live bodies.
    fn body_count(&self) -> usize;

    /// Advance the simulation by `dt` seconds, then clear accumulated forces.
    fn step(&mut self, dt: f32);
}
