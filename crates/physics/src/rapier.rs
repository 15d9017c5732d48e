//! rapier3d implementation of [`PhysicsBackend`].

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointSet, IntegrationParameters, IslandManager, MultibodyJointSet,
    RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{BroadPhaseMultiSap, ColliderBuilder, ColliderSet, NarrowPhase};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};
use tiledrive_common::Pose;

use crate::backend::{BodyDesc, BodyHandle, PhysicsBackend};
use crate::error::PhysicsError;

const FRICTION: f32 = 0.5;
const RESTITUTION: f32 = 0.1;

/// Physics world backed by rapier3d.
pub struct RapierBackend {
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: BroadPhaseMultiSap,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    handles: BTreeMap<BodyHandle, RigidBodyHandle>,
    /// Dynamic bodies with a fractional linear or angular factor.
    scaled: BTreeMap<BodyHandle, AxisFactors>,
    next_handle: u32,
}

#[derive(Debug, Clone, Copy)]
struct AxisFactors {
    linear: Vector3<f32>,
    angular: Vector3<f32>,
}

impl AxisFactors {
    fn of(desc: &BodyDesc) -> Option<Self> {
        let fractional = |v: Vec3| v.to_array().iter().any(|&c| c != 0.0 && c != 1.0);
        (!desc.is_static() && (fractional(desc.linear_factor) || fractional(desc.angular_factor)))
            .then(|| Self {
                linear: to_vector(desc.linear_factor),
                angular: to_vector(desc.angular_factor),
            })
    }
}

impl Default for RapierBackend {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl RapierBackend {
    /// Create an empty world with the given gravity.
    pub fn new(gravity: Vec3) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: to_vector(gravity),
            integration_params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            handles: BTreeMap::new(),
            scaled: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// World-frame linear velocity of a body.
    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let rb = self.bodies.get(*self.handles.get(&body)?)?;
        let v = rb.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    /// World-frame angular velocity of a body.
    pub fn angular_velocity(&self, body: BodyHandle) -> Option<Vec3> {
        let rb = self.bodies.get(*self.handles.get(&body)?)?;
        let w = rb.angvel();
        Some(Vec3::new(w.x, w.y, w.z))
    }

    fn rigid_body_mut(&mut self, body: BodyHandle) -> Option<&mut rapier3d::dynamics::RigidBody> {
        let handle = *self.handles.get(&body)?;
        self.bodies.get_mut(handle)
    }
}

impl PhysicsBackend for RapierBackend {
    fn create_body(&mut self, desc: &BodyDesc) -> Result<BodyHandle, PhysicsError> {
        desc.validate()?;

        let body_type = if desc.is_static() {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let lin = desc.linear_factor;
        let ang = desc.angular_factor;
        let rigid_body = RigidBodyBuilder::new(body_type)
            .position(to_isometry(desc.pose))
            .enabled_translations(lin.x != 0.0, lin.y != 0.0, lin.z != 0.0)
            .enabled_rotations(ang.x != 0.0, ang.y != 0.0, ang.z != 0.0)
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .build();
        let rb_handle = self.bodies.insert(rigid_body);

        // Spread the requested mass over the shapes so the body's total mass
        // matches the description exactly.
        let total_volume: f32 = desc.shapes.iter().map(|s| s.volume()).sum();
        let density = if desc.is_static() {
            1.0
        } else {
            desc.mass / total_volume
        };

        for shape in &desc.shapes {
            let he = shape.half_extents;
            let collider = ColliderBuilder::cuboid(he.x, he.y, he.z)
                .translation(to_vector(shape.offset))
                .density(density)
                .friction(FRICTION)
                .restitution(RESTITUTION)
                .build();
            self.colliders
                .insert_with_parent(collider, rb_handle, &mut self.bodies);
        }

        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.handles.insert(handle, rb_handle);
        if let Some(factors) = AxisFactors::of(desc) {
            self.scaled.insert(handle, factors);
        }
        tracing::debug!(
            ?handle,
            mass = desc.mass,
            shapes = desc.shapes.len(),
            "rapier body created"
        );
        Ok(handle)
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        let rb_handle = self
            .handles
            .remove(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        self.scaled.remove(&body);
        self.bodies.remove(
            rb_handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        tracing::debug!(handle = ?body, "rapier body removed");
        Ok(())
    }

    fn apply_local_force(&mut self, body: BodyHandle, force: Vec3) {
        let Some(rb) = self.rigid_body_mut(body) else {
            tracing::warn!(handle = ?body, "force on unknown body ignored");
            return;
        };
        let rotation = *rb.rotation();
        let world_force = rotation * to_vector(force);
        rb.add_force(world_force, true);
    }

    fn apply_torque(&mut self, body: BodyHandle, torque: Vec3) {
        let Some(rb) = self.rigid_body_mut(body) else {
            tracing::warn!(handle = ?body, "torque on unknown body ignored");
            return;
        };
        rb.add_torque(to_vector(torque), true);
    }

    fn pose(&self, body: BodyHandle) -> Option<Pose> {
        let rb = self.bodies.get(*self.handles.get(&body)?)?;
        Some(from_isometry(rb.position()))
    }

    fn shape_count(&self, body: BodyHandle) -> Option<usize> {
        let rb = self.bodies.get(*self.handles.get(&body)?)?;
        Some(rb.colliders().len())
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn step(&mut self, dt: f32) {
        self.integration_params.dt = dt;

        let before: Vec<_> = self
            .scaled
            .iter()
            .filter_map(|(body, factors)| {
                let rb = self.bodies.get(*self.handles.get(body)?)?;
                Some((*body, *factors, *rb.linvel(), *rb.angvel()))
            })
            .collect();

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // Zero factors are already enforced as locks; scale what the step
        // added along the remaining axes.
        for (body, factors, linvel, angvel) in before {
            if let Some(rb) = self.rigid_body_mut(body) {
                let lin = linvel + (rb.linvel() - linvel).component_mul(&factors.linear);
                let ang = angvel + (rb.angvel() - angvel).component_mul(&factors.angular);
                rb.set_linvel(lin, false);
                rb.set_angvel(ang, false);
            }
        }

        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
        tracing::trace!(dt, bodies = self.handles.len(), "rapier step");
    }
}

fn to_vector(v: Vec3) -> Vector3<f32> {
    Vector3::new(v.x, v.y, v.z)
}

fn to_isometry(pose: Pose) -> Isometry3<f32> {
    let p = pose.position;
    let r = pose.rotation;
    Isometry3::from_parts(
        Translation3::new(p.x, p.y, p.z),
        UnitQuaternion::from_quaternion(Quaternion::new(r.w, r.x, r.y, r.z)),
    )
}

fn from_isometry(iso: &Isometry3<f32>) -> Pose {
    let t = iso.translation.vector;
    let r = iso.rotation;
    Pose::new(
        Vec3::new(t.x, t.y, t.z),
        Quat::from_xyzw(r.i, r.j, r.k, r.w),
    )
}
