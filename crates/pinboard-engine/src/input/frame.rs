use std::collections::HashSet;
use std::path::PathBuf;

use crate::coords::Vec2;

use super::types::{InputEvent, Key, MouseButton};

/// Files dropped onto the window during one frame.
///
/// The platform reports a multi-file drop as one event per path; they are
/// gathered here in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropInfo {
    pub paths: Vec<PathBuf>,
    /// Pointer position at the time of the first path, when known.
    pub pos: Option<Vec2>,
}

impl DropInfo {
    #[inline]
    pub fn first_path(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

/// Per-frame input deltas.
///
/// `InputState` holds what is currently down; `InputFrame` holds what changed
/// this frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    pub keys_pressed: HashSet<Key>,
    pub keys_released: HashSet<Key>,
    pub buttons_pressed: HashSet<MouseButton>,
    pub buttons_released: HashSet<MouseButton>,

    /// Files dropped this frame, if any.
    pub drop: Option<DropInfo>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.drop = None;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }
}
