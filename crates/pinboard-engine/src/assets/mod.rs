//! Decoded image assets.
//!
//! An [`Image`] is CPU-side RGBA8 pixel data plus a process-unique id that
//! GPU renderers use as their texture-cache key.

mod raster;

pub use raster::{Image, ImageId};
