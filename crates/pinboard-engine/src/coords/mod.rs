//! Coordinate and geometry types shared across the engine and the board.
//!
//! Canonical screen space:
//! - Logical pixels (DPI-aware)
//! - Origin top-left
//! - +X right, +Y down
//!
//! Draw lists carry a `Transform2` per command that maps command-local
//! coordinates into screen space. Renderers convert screen space to NDC
//! (GPU) or to physical pixels (CPU) themselves.

mod rect;
mod transform;
mod vec2;
mod viewport;

pub use rect::Rect;
pub use transform::Transform2;
pub use vec2::Vec2;
pub use viewport::Viewport;
