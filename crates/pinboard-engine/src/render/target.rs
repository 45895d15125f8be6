use image::RgbaImage;

use crate::coords::{Vec2, Viewport};
use crate::paint::Color;
use crate::scene::DrawList;

/// Size of a render target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetSize {
    /// Physical pixels.
    pub width: u32,
    /// Physical pixels.
    pub height: u32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl TargetSize {
    #[inline]
    pub fn new(width: u32, height: u32, scale_factor: f32) -> Self {
        Self { width, height, scale_factor }
    }

    /// Logical viewport covered by the target.
    #[inline]
    pub fn viewport(self) -> Viewport {
        let s = self.effective_scale();
        Viewport::new(self.width as f32 / s, self.height as f32 / s)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Physical pixel under a logical position (top-left origin), or `None`
    /// when the position falls outside the target.
    pub fn pixel_at(self, logical: Vec2) -> Option<(u32, u32)> {
        if !logical.is_finite() {
            return None;
        }
        let s = self.effective_scale();
        let x = (logical.x * s).floor();
        let y = (logical.y * s).floor();
        if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
            return None;
        }
        Some((x as u32, y as u32))
    }

    /// Scale factor, with non-positive or non-finite values treated as 1.
    #[inline]
    pub fn effective_scale(self) -> f32 {
        if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        }
    }
}

/// Renders draw lists into a target that is never presented and reads the
/// result back.
///
/// Commands are in logical pixels; the target is `size` physical pixels.
/// Implemented by the GPU off-screen renderer and by the CPU rasterizer.
pub trait Offscreen {
    /// Renders `list` over `clear` and returns the whole target as straight
    /// (non-premultiplied) RGBA8, top row first.
    fn capture(&mut self, list: &DrawList, clear: Color, size: TargetSize) -> anyhow::Result<RgbaImage>;

    /// Renders `list` over `clear` and returns the premultiplied RGBA8 value
    /// of physical pixel `(x, y)`. Pixels outside the target read as `clear`.
    fn read_pixel(
        &mut self,
        list: &DrawList,
        clear: Color,
        size: TargetSize,
        x: u32,
        y: u32,
    ) -> anyhow::Result<[u8; 4]>;
}

/// Converts premultiplied RGBA8 to straight alpha in place.
pub(crate) fn unpremultiply(img: &mut RgbaImage) {
    for px in img.pixels_mut() {
        let [r, g, b, a] = px.0;
        if a == 0 {
            px.0 = [0, 0, 0, 0];
        } else if a < 255 {
            let un = |c: u8| ((c as u32 * 255 + a as u32 / 2) / a as u32).min(255) as u8;
            px.0 = [un(r), un(g), un(b), a];
        }
    }
}
