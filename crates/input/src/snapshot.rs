use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Integer key code as delivered by the platform (DOM `keyCode` numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const A: Self = Self(65);
    pub const D: Self = Self(68);
    pub const S: Self = Self(83);
    pub const W: Self = Self(87);
    pub const ARROW_LEFT: Self = Self(37);
    pub const ARROW_UP: Self = Self(38);
    pub const ARROW_RIGHT: Self = Self(39);
    pub const ARROW_DOWN: Self = Self(40);
    pub const SPACE: Self = Self(32);

    /// Code for an ASCII letter, case-insensitive.
    pub fn from_letter(c: char) -> Option<Self> {
        c.is_ascii_alphabetic()
            .then(|| Self(c.to_ascii_uppercase() as u32))
    }
}

/// Frozen key state for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pressed: BTreeSet<KeyCode>,
}

impl InputSnapshot {
    /// Snapshot with nothing pressed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_pressed(keys: impl IntoIterator<Item = KeyCode>) -> Self {
        Self {
            pressed: keys.into_iter().collect(),
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn pressed(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }
}

/// Live key state, written by the platform event handler between frames.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: BTreeSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn press(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            tracing::trace!(code = key.0, "key down");
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            tracing::trace!(code = key.0, "key up");
        }
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Freeze the current state. Later writes do not affect the snapshot.
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            pressed: self.held.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_codes() {
        assert_eq!(KeyCode::from_letter('w'), Some(KeyCode::W));
        assert_eq!(KeyCode::from_letter('D'), Some(KeyCode::D));
        assert_eq!(KeyCode::from_letter('1'), None);
    }

    #[test]
    fn held_keys_persist_across_snapshots() {
        let mut state = InputState::new();
        state.press(KeyCode::W);
        assert!(state.snapshot().is_pressed(KeyCode::W));
        assert!(state.snapshot().is_pressed(KeyCode::W));
        state.release(KeyCode::W);
        assert!(!state.snapshot().is_pressed(KeyCode::W));
    }

    #[test]
    fn snapshot_is_frozen() {
        let mut state = InputState::new();
        state.set(KeyCode::A, true);
        let frame = state.snapshot();
        state.set(KeyCode::A, false);
        state.press(KeyCode::D);
        assert!(frame.is_pressed(KeyCode::A));
        assert!(!frame.is_pressed(KeyCode::D));
    }

    #[test]
    fn unknown_codes_read_unpressed() {
        let snap = InputSnapshot::from_pressed([KeyCode(9999)]);
        assert!(!snap.is_pressed(KeyCode::W));
        assert!(!InputSnapshot::empty().is_pressed(KeyCode(u32::MAX)));
    }

    #[test]
    fn clear_releases_everything() {
        let mut state = InputState::new();
        state.press(KeyCode::W);
        state.press(KeyCode::A);
        state.clear();
        assert!(state.snapshot().is_empty());
    }
}
