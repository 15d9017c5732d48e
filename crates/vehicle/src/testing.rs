//! Recording physics backend for unit tests.

use std::collections::BTreeMap;

use glam::Vec3;
use tiledrive_common::Pose;
use tiledrive_physics::{BodyDesc, BodyHandle, PhysicsBackend, PhysicsError};

#[derive(Debug, Default)]
pub struct RecordingPhysics {
    pub bodies: BTreeMap<BodyHandle, (BodyDesc, Pose)>,
    pub forces: Vec<(BodyHandle, Vec3)>,
    pub torques: Vec<(BodyHandle, Vec3)>,
    pub steps: usize,
    next: u32,
}

impl RecordingPhysics {
    pub fn set_pose(&mut self, body: BodyHandle, pose: Pose) {
        if let Some(entry) = self.bodies.get_mut(&body) {
            entry.1 = pose;
        }
    }

    pub fn net_force(&self) -> Vec3 {
        self.forces.iter().map(|(_, f)| *f).sum()
    }

    pub fn net_torque(&self) -> Vec3 {
        self.torques.iter().map(|(_, t)| *t).sum()
    }
}

impl PhysicsBackend for RecordingPhysics {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;
        let handle = BodyHandle(self.next);
        self.next += 1;
        self.bodies.insert(handle, (desc.clone(), desc.pose));
        Ok(handle)
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(&body)
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn apply_local_force(&mut self, body: BodyHandle, force: Vec3) {
        self.forces.push((body, force));
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: Vec3) {
        self.torques.push((body, torque));
    }

    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        self.bodies.get(&body).map(|(_, pose)| *pose)
    }

    fn shape_count(&self, body: BodyHandle) -> Option<usize> {
        self.bodies.get(&body).map(|(desc, _)| desc.shapes.len())
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn step(&mut self, _dt: f32) {
        self.steps += 1;
    }
}
