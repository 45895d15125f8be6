//! GPU device + surface management.
//!
//! Creates the wgpu device/queue, configures the window surface and hands out
//! per-frame encoders. Off-screen targets live in `render`.

mod gpu;
mod init;
mod surface;

pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
