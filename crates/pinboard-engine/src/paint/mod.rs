//! Paint model shared between the board and renderers.
//!
//! Scope: color representation (premultiplied alpha). Geometry types remain
//! in `coords`; image pixels live in `assets`.

pub mod color;

pub use color::Color;
