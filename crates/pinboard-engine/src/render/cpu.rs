//! Software rasterizer for draw lists.
//!
//! Samples every physical pixel at its center with no anti-aliasing and
//! composites premultiplied source-over, the same rules the GPU pipelines
//! follow with a single sample per pixel. Used where no device exists.

use image::{Rgba, RgbaImage};

use crate::coords::{Rect, Transform2, Vec2};
use crate::paint::Color;
use crate::scene::{DrawCmd, DrawList};

use super::common::quad_placement;
use super::target::{unpremultiply, Offscreen, TargetSize};

/// CPU implementation of [`Offscreen`].
#[derive(Debug, Default)]
pub struct CpuRasterizer {
    frame: RgbaImage,
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rasterizes `list` over `clear`, leaving premultiplied pixels in the
    /// internal frame.
    pub fn rasterize(&mut self, list: &DrawList, clear: Color, size: TargetSize) -> &RgbaImage {
        let bg = Rgba(clear.to_premul_rgba8());
        if self.frame.dimensions() == (size.width, size.height) {
            self.frame.pixels_mut().for_each(|p| *p = bg);
        } else {
            self.frame = RgbaImage::from_pixel(size.width, size.height, bg);
        }

        if size.is_empty() {
            return &self.frame;
        }

        let to_physical = Transform2::scaling(Vec2::splat(size.effective_scale()));
        for cmd in list.items() {
            let placement = to_physical * quad_placement(cmd.transform(), cmd.rect());
            match cmd {
                DrawCmd::Fill(fill) => {
                    if fill.rect.is_empty() {
                        continue;
                    }
                    let src = fill.color.to_premul_rgba8();
                    fill_quad(&mut self.frame, placement, |_| Some(src));
                }
                DrawCmd::Image(img) => {
                    let pixels = img.image.pixels();
                    let (w, h) = pixels.dimensions();
                    if img.rect.is_empty() || w == 0 || h == 0 {
                        continue;
                    }
                    fill_quad(&mut self.frame, placement, |uv| {
                        let tx = ((uv.x * w as f32) as u32).min(w - 1);
                        let ty = ((uv.y * h as f32) as u32).min(h - 1);
                        Some(premultiply(pixels.get_pixel(tx, ty).0))
                    });
                }
            }
        }

        &self.frame
    }
}

impl Offscreen for CpuRasterizer {
    fn capture(&mut self, list: &DrawList, clear: Color, size: TargetSize) -> anyhow::Result<RgbaImage> {
        let mut out = self.rasterize(list, clear, size).clone();
        unpremultiply(&mut out);
        Ok(out)
    }

    fn read_pixel(
        &mut self,
        list: &DrawList,
        clear: Color,
        size: TargetSize,
        x: u32,
        y: u32,
    ) -> anyhow::Result<[u8; 4]> {
        if x >= size.width || y >= size.height {
            return Ok(clear.to_premul_rgba8());
        }
        Ok(self.rasterize(list, clear, size).get_pixel(x, y).0)
    }
}

/// Composites `shade(uv)` over every pixel whose center falls inside the unit
/// square mapped by `placement`.
fn fill_quad(frame: &mut RgbaImage, placement: Transform2, shade: impl Fn(Vec2) -> Option<[u8; 4]>) {
    let Some(inverse) = placement.inverse() else { return };
    let unit = Rect::new(0.0, 0.0, 1.0, 1.0);
    let Some(bounds) = Rect::bounding(unit.corners().map(|c| placement.apply(c))) else { return };
    if !bounds.is_finite() {
        return;
    }

    let (fw, fh) = frame.dimensions();
    let x0 = bounds.min().x.floor().max(0.0) as u32;
    let y0 = bounds.min().y.floor().max(0.0) as u32;
    let x1 = (bounds.max().x.ceil().max(0.0) as u32).min(fw);
    let y1 = (bounds.max().y.ceil().max(0.0) as u32).min(fh);

    for py in y0..y1 {
        for px in x0..x1 {
            let uv = inverse.apply(Vec2::new(px as f32 + 0.5, py as f32 + 0.5));
            if !(0.0..1.0).contains(&uv.x) || !(0.0..1.0).contains(&uv.y) {
                continue;
            }
            if let Some(src) = shade(uv) {
                let dst = frame.get_pixel_mut(px, py);
                dst.0 = source_over(src, dst.0);
            }
        }
    }
}

#[inline]
fn premultiply([r, g, b, a]: [u8; 4]) -> [u8; 4] {
    let m = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
    [m(r), m(g), m(b), a]
}

/// Premultiplied source-over.
#[inline]
fn source_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let inv = 255 - src[3] as u32;
    std::array::from_fn(|i| (src[i] as u32 + (dst[i] as u32 * inv + 127) / 255).min(255) as u8)
}
