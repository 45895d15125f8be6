use std::path::PathBuf;

use pinboard_engine::input::Key;
use pinboard_engine::paint::Color;

/// Outline drawn around the selected item.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Highlight {
    pub color: Color,
    /// Stroke width in world units.
    pub width: f32,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            color: Color::from_rgba8(255, 255, 0, 255),
            width: 5.0,
        }
    }
}

/// Commands reachable from the keyboard.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Screenshot,
    Raise,
    Lower,
    Remove,
}

/// Key bindings. Keys are physical, so `S` fires with or without Shift.
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap {
    pub screenshot: Key,
    pub raise: Key,
    pub lower: Key,
    pub remove: Key,
    /// Held to pan the camera with the pointer.
    pub navigate: Key,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            screenshot: Key::S,
            raise: Key::ArrowUp,
            lower: Key::ArrowDown,
            remove: Key::Delete,
            navigate: Key::Alt,
        }
    }
}

impl Keymap {
    pub fn action(&self, key: Key) -> Option<Action> {
        match key {
            k if k == self.screenshot => Some(Action::Screenshot),
            k if k == self.raise => Some(Action::Raise),
            k if k == self.lower => Some(Action::Lower),
            k if k == self.remove => Some(Action::Remove),
            _ => None,
        }
    }
}

/// Board appearance and bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub background: Color,
    pub highlight: Highlight,
    /// Screenshot destination, overwritten on every capture.
    pub screenshot_path: PathBuf,
    pub keymap: Keymap,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            background: Color::BLACK,
            highlight: Highlight::default(),
            screenshot_path: PathBuf::from("project_01.png"),
            keymap: Keymap::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_resolve() {
        let keys = Keymap::default();
        assert_eq!(keys.action(Key::S), Some(Action::Screenshot));
        assert_eq!(keys.action(Key::ArrowUp), Some(Action::Raise));
        assert_eq!(keys.action(Key::ArrowDown), Some(Action::Lower));
        assert_eq!(keys.action(Key::Delete), Some(Action::Remove));
        assert_eq!(keys.action(Key::Alt), None);
        assert_eq!(keys.action(Key::Q), None);
    }

    #[test]
    fn rebinding_replaces_default() {
        let keys = Keymap { screenshot: Key::F12, ..Keymap::default() };
        assert_eq!(keys.action(Key::F12), Some(Action::Screenshot));
        assert_eq!(keys.action(Key::S), None);
    }

    #[test]
    fn default_highlight_is_yellow() {
        let h = Highlight::default();
        assert_eq!(h.color.to_premul_rgba8(), [255, 255, 0, 255]);
        assert_eq!(h.width, 5.0);
    }
}
