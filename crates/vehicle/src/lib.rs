//! Drivable entity and motion controller.
//!
//! # Invariants
//! - The entity's rigid body and visual transform are only reconciled by
//!   [`MotionController::sync_pose`], once per frame after the physics step.
//! - Drive forces act along body-local axes; steering torque acts about
//!   world up.
//! - Planar motion and yaw-only rotation come from the body's per-axis
//!   factors, set once at spawn.

mod controller;
mod entity;

pub use controller::MotionController;
pub use entity::{DrivableEntity, DriveConfig, LOCAL_FORWARD};

#[cfg(test)]
pub(crate) mod testing;
