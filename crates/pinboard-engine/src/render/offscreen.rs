use anyhow::{Context, Result};
use image::RgbaImage;

use crate::paint::Color;
use crate::scene::DrawList;

use super::common::clear_pass;
use super::target::{unpremultiply, Offscreen, TargetSize};
use super::{RenderCtx, RenderTarget, SceneRenderer};

/// Format of off-screen targets. Unorm so 8-bit draw colors land unchanged.
pub const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// GPU render-to-texture with blocking read-back.
///
/// Keeps the target texture and staging buffer between calls and rebuilds
/// them only when the requested size grows or changes.
#[derive(Default)]
pub struct OffscreenRenderer {
    scene: SceneRenderer,
    target: Option<Target>,
    readback: Option<Readback>,
}

struct Target {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct Readback {
    buffer: wgpu::Buffer,
    size: u64,
}

impl OffscreenRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows a device/queue pair for a round of off-screen work.
    pub fn bind<'a>(&'a mut self, device: &'a wgpu::Device, queue: &'a wgpu::Queue) -> GpuOffscreen<'a> {
        GpuOffscreen { device, queue, renderer: self }
    }

    fn ensure_target(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if let Some(t) = &self.target {
            if t.width == width && t.height == height {
                return;
            }
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("pinboard offscreen target"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: OFFSCREEN_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("offscreen target resized to {width}x{height}");
        self.target = Some(Target { texture, view, width, height });
    }

    /// Renders `list` over `clear` into the target, copies the `w`×`h`
    /// region at `(x, y)` out and returns it as tightly packed RGBA8 rows.
    #[allow(clippy::too_many_arguments)]
    fn render_region(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        list: &DrawList,
        clear: Color,
        size: TargetSize,
        (x, y): (u32, u32),
        (w, h): (u32, u32),
    ) -> Result<Vec<u8>> {
        anyhow::ensure!(!size.is_empty(), "off-screen target has zero size");
        let max = device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            size.width <= max && size.height <= max,
            "off-screen target {}x{} exceeds device limit {max}",
            size.width,
            size.height
        );

        self.ensure_target(device, size.width, size.height);
        let Some(target) = self.target.as_ref() else {
            anyhow::bail!("off-screen target unavailable");
        };

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("pinboard offscreen encoder"),
        });
        clear_pass(&mut encoder, &target.view, clear);
        {
            let ctx = RenderCtx::new(
                device,
                queue,
                OFFSCREEN_FORMAT,
                size.viewport(),
                size.effective_scale(),
            );
            let mut rt = RenderTarget::new(&mut encoder, &target.view);
            self.scene.render(&ctx, &mut rt, list);
        }

        let padded_row = align_to(w * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let texture = &target.texture;
        let readback = {
            let size = padded_row as u64 * h as u64;
            let reuse = matches!(&self.readback, Some(r) if r.size >= size);
            if !reuse {
                self.readback = Some(Readback {
                    buffer: device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some("pinboard readback buffer"),
                        size,
                        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                        mapped_at_creation: false,
                    }),
                    size,
                });
            }
            match self.readback.as_ref() {
                Some(r) => &r.buffer,
                None => anyhow::bail!("readback buffer unavailable"),
            }
        };

        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(h),
                },
            },
            wgpu::Extent3d { width: w, height: h, depth_or_array_layers: 1 },
        );
        queue.submit(Some(encoder.finish()));

        let slice = readback.slice(..padded_row as u64 * h as u64);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device
            .poll(wgpu::PollType::wait_indefinitely())
            .context("device poll failed during read-back")?;
        rx.recv()
            .context("read-back channel closed")?
            .context("failed to map read-back buffer")?;

        let row_bytes = w as usize * 4;
        let mut out = Vec::with_capacity(row_bytes * h as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in 0..h as usize {
                let start = row * padded_row as usize;
                out.extend_from_slice(&mapped[start..start + row_bytes]);
            }
        }
        readback.unmap();

        Ok(out)
    }
}

/// [`OffscreenRenderer`] bound to a device for one round of work.
pub struct GpuOffscreen<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    renderer: &'a mut OffscreenRenderer,
}

impl Offscreen for GpuOffscreen<'_> {
    fn capture(&mut self, list: &DrawList, clear: Color, size: TargetSize) -> Result<RgbaImage> {
        let bytes = self.renderer.render_region(
            self.device,
            self.queue,
            list,
            clear,
            size,
            (0, 0),
            (size.width, size.height),
        )?;
        let mut img = RgbaImage::from_raw(size.width, size.height, bytes)
            .context("read-back size does not match target")?;
        unpremultiply(&mut img);
        Ok(img)
    }

    fn read_pixel(
        &mut self,
        list: &DrawList,
        clear: Color,
        size: TargetSize,
        x: u32,
        y: u32,
    ) -> Result<[u8; 4]> {
        if x >= size.width || y >= size.height {
            return Ok(clear.to_premul_rgba8());
        }
        let bytes = self
            .renderer
            .render_region(self.device, self.queue, list, clear, size, (x, y), (1, 1))?;
        match bytes.as_slice() {
            [r, g, b, a] => Ok([*r, *g, *b, *a]),
            other => anyhow::bail!("expected 4 read-back bytes, got {}", other.len()),
        }
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_align_to_copy_alignment() {
        assert_eq!(align_to(4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 256);
        assert_eq!(align_to(256, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 256);
        assert_eq!(align_to(257 * 4, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT), 1280);
    }
}
