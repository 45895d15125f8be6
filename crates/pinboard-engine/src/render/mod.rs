//! Rendering subsystem.
//!
//! Renderers consume `scene` draw lists. Commands are in logical pixels
//! (top-left origin, +Y down); vertex shaders convert to NDC with a viewport
//! uniform.
//!
//! - [`SceneRenderer`] draws into the window surface (or any target).
//! - [`OffscreenRenderer`] draws into a private texture and reads it back.
//! - [`CpuRasterizer`] reads back the same pixels without a device.

mod common;
pub mod cpu;
mod ctx;
mod offscreen;
mod scene;
mod target;

pub use cpu::CpuRasterizer;
pub use ctx::{RenderCtx, RenderTarget};
pub use offscreen::{GpuOffscreen, OffscreenRenderer, OFFSCREEN_FORMAT};
pub use scene::SceneRenderer;
pub use target::{Offscreen, TargetSize};

pub(crate) use common::clear_pass;
