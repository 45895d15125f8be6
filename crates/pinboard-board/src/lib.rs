//! Pinboard board crate.
//!
//! Images dropped onto the window become items on a [`Board`]. A click
//! selects the topmost item under the pointer by rendering every item in a
//! unique color off-screen and reading back one pixel; drags move the
//! selection, the arrow keys step it through the draw order, and `S` writes
//! a screenshot.

pub mod app;
pub mod board;
pub mod camera;
pub mod config;
pub mod error;
pub mod item;
pub mod pick;

pub use app::Application;
pub use board::{Board, ItemId, Reorder};
pub use camera::Camera2;
pub use config::{Action, BoardConfig, Highlight, Keymap};
pub use error::{BoardError, ReorderError};
pub use item::{DrawMode, SceneItem};
