//! Input: raw key state collected between frames and frozen into an
//! immutable snapshot once per frame.
//!
//! # Invariants
//! - Consumers read an [`InputSnapshot`], never the live [`InputState`].
//! - A held key stays pressed in every snapshot until released.
//! - Unknown key codes read as not pressed.

pub mod action;
mod snapshot;

pub use action::{DriveIntent, KeyBindings};
pub use snapshot::{InputSnapshot, InputState, KeyCode};
