use std::f32::consts::{PI, TAU};

use glam::{Mat4, Vec3};

/// Third-person camera that trails a target and can be orbited around it.
pub struct ChaseCamera {
    pub target: Vec3,
    /// Heading being followed, radians around +Y. 0 faces +Z.
    pub heading: f32,
    /// User orbit added on top of the heading.
    pub orbit_yaw: f32,
    /// Elevation above the horizon, radians.
    pub pitch: f32,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub sensitivity: f32,
    /// How quickly the camera catches up, per second.
    pub follow_rate: f32,
}

impl Default for ChaseCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            heading: 0.0,
            orbit_yaw: 0.0,
            pitch: 35.0_f32.to_radians(),
            distance: 8.0,
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
            sensitivity: 0.005,
            follow_rate: 4.0,
        }
    }
}

impl ChaseCamera {
    pub const MIN_DISTANCE: f32 = 2.0;
    pub const MAX_DISTANCE: f32 = 60.0;

    /// Jump straight to `target` and `heading`.
    pub fn snap_to(&mut self, target: Vec3, heading: f32) {
        self.target = target;
        self.heading = heading;
    }

    /// Ease toward `target` and `heading`, framerate independent.
    pub fn follow(&mut self, target: Vec3, heading: f32, dt: f32) {
        let t = 1.0 - (-self.follow_rate * dt.max(0.0)).exp();
        self.target = self.target.lerp(target, t);
        let diff = (heading - self.heading + PI).rem_euclid(TAU) - PI;
        self.heading += diff * t;
    }

    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.orbit_yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity)
            .clamp(5.0_f32.to_radians(), 85.0_f32.to_radians());
    }

    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance - amount).clamp(Self::MIN_DISTANCE, Self::MAX_DISTANCE);
    }

    pub fn eye(&self) -> Vec3 {
        let yaw = self.heading + self.orbit_yaw;
        let behind = -Vec3::new(yaw.sin(), 0.0, yaw.cos());
        self.target
            + behind * (self.distance * self.pitch.cos())
            + Vec3::Y * (self.distance * self.pitch.sin())
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
