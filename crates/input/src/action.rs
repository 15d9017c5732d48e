use serde::{Deserialize, Serialize};

use crate::snapshot::{InputSnapshot, KeyCode};

/// Keys that drive the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub forward: KeyCode,
    pub backward: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: KeyCode::W,
            backward: KeyCode::S,
            left: KeyCode::A,
            right: KeyCode::D,
        }
    }
}

/// What the driver asks for this frame, after opposing keys cancel.
///
/// Each axis is -1, 0 or 1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveIntent {
    /// +1 forward, -1 backward.
    pub throttle: f32,
    /// +1 left, -1 right.
    pub steer: f32,
}

impl DriveIntent {
    pub fn from_snapshot(input: &InputSnapshot, bindings: &KeyBindings) -> Self {
        Self {
            throttle: axis(input.is_pressed(bindings.forward), input.is_pressed(bindings.backward)),
            steer: axis(input.is_pressed(bindings.left), input.is_pressed(bindings.right)),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.throttle == 0.0 && self.steer == 0.0
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    f32::from(u8::from(positive)) - f32::from(u8::from(negative))
}
