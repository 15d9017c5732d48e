use crate::backend::BodyHandle;

/// Errors from physics body management.
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(BodyHandle),
    #[error("body mass must be finite and non-negative, got {0}")]
    InvalidMass(f32),
    #[error("axis factors must be finite and non-negative, got {0:?}")]
    InvalidFactor([f32; 3]),
    #[error("body has no collision shapes")]
    NoShapes,
    #[error("box half-extents must be positive, got {0:?}")]
    InvalidHalfExtents([f32; 3]),
}
