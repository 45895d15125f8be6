//! Pinboard engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the board: window and event
//! loop, input translation, draw lists with a scoped transform stack, image
//! assets, and the renderers (on-screen, off-screen read-back, CPU).

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod assets;
pub mod logging;
pub mod coords;
pub mod render;
pub mod paint;
pub mod scene;
