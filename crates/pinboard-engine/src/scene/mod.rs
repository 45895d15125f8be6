//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands in paint order (back-to-front)
//! - carry a transform stack whose pushes are scoped by a guard, so every
//!   exit path restores the previous transform

mod cmd;
mod list;

pub use cmd::{DrawCmd, FillCmd, ImageCmd};
pub use list::{DrawList, TransformScope};
