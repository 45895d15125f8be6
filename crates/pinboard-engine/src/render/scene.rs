use std::collections::HashMap;
use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::assets::{Image, ImageId};
use crate::scene::{DrawCmd, DrawList};

use super::common::{
    premul_alpha_blend, quad_placement, QuadVertex, ViewportUniform, QUAD_INDICES, QUAD_VERTICES,
};
use super::{RenderCtx, RenderTarget};

/// Textures not drawn for this many renders are released.
const EVICT_AFTER_RENDERS: u64 = 120;

/// Draws a [`DrawList`] in paint order.
///
/// Consecutive commands of the same kind (and, for images, the same texture)
/// are merged into one instanced draw; anything else switches pipeline in the
/// same pass, so interleaved fills and images keep their recorded order.
///
/// Pipelines are built lazily per target format, which lets one renderer
/// serve both the window surface and off-screen targets. Image textures are
/// uploaded on first use and cached by [`ImageId`].
#[derive(Default)]
pub struct SceneRenderer {
    shared: Option<Shared>,
    pipelines: HashMap<wgpu::TextureFormat, Pipelines>,

    fill_vbo: InstanceBuffer,
    image_vbo: InstanceBuffer,

    textures: HashMap<ImageId, CachedTexture>,
    renders: u64,

    fills: Vec<FillInstance>,
    images: Vec<ImageInstance>,
    batches: Vec<Batch>,
}

struct Shared {
    viewport_ubo: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    fill_layout: wgpu::PipelineLayout,
    image_layout: wgpu::PipelineLayout,
    fill_shader: wgpu::ShaderModule,
    image_shader: wgpu::ShaderModule,
}

struct Pipelines {
    fill: wgpu::RenderPipeline,
    image: wgpu::RenderPipeline,
}

struct CachedTexture {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    last_used: u64,
}

#[derive(Debug, Clone, PartialEq)]
enum Batch {
    Fill(Range<u32>),
    Image { id: ImageId, range: Range<u32> },
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `list` into `target` on top of its current contents.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, list: &DrawList) {
        self.ensure_shared(ctx);
        self.ensure_pipelines(ctx);
        self.renders += 1;

        plan_batches(list.items(), &mut self.fills, &mut self.images, &mut self.batches);
        self.ensure_textures(ctx, list);
        self.evict_stale();

        if self.batches.is_empty() {
            return;
        }

        let Some(shared) = self.shared.as_ref() else { return };
        ctx.queue.write_buffer(
            &shared.viewport_ubo,
            0,
            bytemuck::bytes_of(&ViewportUniform::new(ctx.viewport)),
        );
        self.fill_vbo.upload(ctx, "pinboard fill instances", bytemuck::cast_slice(&self.fills));
        self.image_vbo.upload(ctx, "pinboard image instances", bytemuck::cast_slice(&self.images));

        let Some(pipelines) = self.pipelines.get(&ctx.target_format) else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("pinboard scene pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_bind_group(0, &shared.viewport_bind_group, &[]);
        rpass.set_vertex_buffer(0, shared.quad_vbo.slice(..));
        rpass.set_index_buffer(shared.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);

        for batch in &self.batches {
            match batch {
                Batch::Fill(range) => {
                    let Some(vbo) = self.fill_vbo.buffer.as_ref() else { continue };
                    rpass.set_pipeline(&pipelines.fill);
                    rpass.set_vertex_buffer(1, vbo.slice(..));
                    rpass.draw_indexed(0..6, 0, range.clone());
                }
                Batch::Image { id, range } => {
                    let Some(vbo) = self.image_vbo.buffer.as_ref() else { continue };
                    let Some(tex) = self.textures.get(id) else { continue };
                    rpass.set_pipeline(&pipelines.image);
                    rpass.set_bind_group(1, &tex.bind_group, &[]);
                    rpass.set_vertex_buffer(1, vbo.slice(..));
                    rpass.draw_indexed(0..6, 0, range.clone());
                }
            }
        }
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_shared(&mut self, ctx: &RenderCtx<'_>) {
        if self.shared.is_some() {
            return;
        }
        let device = ctx.device;

        let viewport_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pinboard viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: ViewportUniform::min_binding_size(),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("pinboard texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let viewport_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("pinboard viewport ubo"),
            size: ViewportUniform::SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("pinboard viewport bind group"),
            layout: &viewport_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("pinboard image sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pinboard quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pinboard quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let fill_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pinboard fill pipeline layout"),
            bind_group_layouts: &[&viewport_bgl],
            immediate_size: 0,
        });
        let image_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pinboard image pipeline layout"),
            bind_group_layouts: &[&viewport_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let fill_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pinboard fill shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/fill.wgsl").into()),
        });
        let image_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("pinboard image shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/image.wgsl").into()),
        });

        self.shared = Some(Shared {
            viewport_ubo,
            viewport_bind_group,
            texture_bgl,
            sampler,
            quad_vbo,
            quad_ibo,
            fill_layout,
            image_layout,
            fill_shader,
            image_shader,
        });
    }

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipelines.contains_key(&ctx.target_format) {
            return;
        }
        let Some(shared) = self.shared.as_ref() else { return };

        let fill = create_pipeline(
            ctx.device,
            "pinboard fill pipeline",
            &shared.fill_layout,
            &shared.fill_shader,
            &[QuadVertex::layout(), FillInstance::layout()],
            ctx.target_format,
        );
        let image = create_pipeline(
            ctx.device,
            "pinboard image pipeline",
            &shared.image_layout,
            &shared.image_shader,
            &[QuadVertex::layout(), ImageInstance::layout()],
            ctx.target_format,
        );

        log::debug!("scene pipelines built for {:?}", ctx.target_format);
        self.pipelines.insert(ctx.target_format, Pipelines { fill, image });
    }

    fn ensure_textures(&mut self, ctx: &RenderCtx<'_>, list: &DrawList) {
        let Some(shared) = self.shared.as_ref() else { return };
        let now = self.renders;

        for cmd in list.items() {
            let DrawCmd::Image(cmd) = cmd else { continue };
            if cmd.image.width() == 0 || cmd.image.height() == 0 {
                continue;
            }
            if let Some(cached) = self.textures.get_mut(&cmd.image.id()) {
                cached.last_used = now;
                continue;
            }
            let cached = upload_texture(ctx, shared, &cmd.image, now);
            self.textures.insert(cmd.image.id(), cached);
        }
    }

    fn evict_stale(&mut self) {
        let now = self.renders;
        let before = self.textures.len();
        self.textures
            .retain(|_, t| now.saturating_sub(t.last_used) < EVICT_AFTER_RENDERS);
        let evicted = before - self.textures.len();
        if evicted > 0 {
            log::debug!("evicted {evicted} unused image texture(s)");
        }
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(premul_alpha_blend()),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Mirrored placements flip winding.
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: None,
        // Single sample: pick colors must land on pixels unblended.
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

fn upload_texture(ctx: &RenderCtx<'_>, shared: &Shared, image: &Image, now: u64) -> CachedTexture {
    let max = ctx.device.limits().max_texture_dimension_2d;
    let fitted;
    let pixels = if image.width() > max || image.height() > max {
        let scale = max as f32 / image.width().max(image.height()) as f32;
        let w = ((image.width() as f32 * scale) as u32).clamp(1, max);
        let h = ((image.height() as f32 * scale) as u32).clamp(1, max);
        log::debug!(
            "downscaling {}x{} image to {w}x{h} for the device texture limit",
            image.width(),
            image.height()
        );
        fitted = image::imageops::resize(image.pixels(), w, h, image::imageops::FilterType::Triangle);
        &fitted
    } else {
        image.pixels()
    };

    let size = wgpu::Extent3d {
        width: pixels.width(),
        height: pixels.height(),
        depth_or_array_layers: 1,
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("pinboard image texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.width),
            rows_per_image: Some(size.height),
        },
        size,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("pinboard image bind group"),
        layout: &shared.texture_bgl,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&shared.sampler),
            },
        ],
    });

    CachedTexture { _texture: texture, bind_group, last_used: now }
}

/// Splits `items` into instance data and ordered batches. Empty fills and
/// zero-sized images are skipped.
fn plan_batches(
    items: &[DrawCmd],
    fills: &mut Vec<FillInstance>,
    images: &mut Vec<ImageInstance>,
    batches: &mut Vec<Batch>,
) {
    fills.clear();
    images.clear();
    batches.clear();

    for item in items {
        match item {
            DrawCmd::Fill(cmd) => {
                if cmd.rect.is_empty() || !cmd.color.is_finite() {
                    continue;
                }
                let index = fills.len() as u32;
                fills.push(FillInstance {
                    xform: quad_placement(cmd.transform, cmd.rect).to_columns(),
                    color: cmd.color.to_array(),
                });
                match batches.last_mut() {
                    Some(Batch::Fill(range)) => range.end = index + 1,
                    _ => batches.push(Batch::Fill(index..index + 1)),
                }
            }
            DrawCmd::Image(cmd) => {
                if cmd.rect.is_empty() || cmd.image.width() == 0 || cmd.image.height() == 0 {
                    continue;
                }
                let index = images.len() as u32;
                let id = cmd.image.id();
                images.push(ImageInstance {
                    xform: quad_placement(cmd.transform, cmd.rect).to_columns(),
                });
                match batches.last_mut() {
                    Some(Batch::Image { id: last, range }) if *last == id => range.end = index + 1,
                    _ => batches.push(Batch::Image { id, range: index..index + 1 }),
                }
            }
        }
    }
}

// ── instance data ─────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct FillInstance {
    xform: [[f32; 2]; 3],
    color: [f32; 4],
}

impl FillInstance {
    const ATTRS: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        1 => Float32x2, // column 0
        2 => Float32x2, // column 1
        3 => Float32x2, // translation
        4 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<FillInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageInstance {
    xform: [[f32; 2]; 3],
}

impl ImageInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImageInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Growable vertex buffer for per-instance data.
#[derive(Default)]
struct InstanceBuffer {
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

impl InstanceBuffer {
    fn upload(&mut self, ctx: &RenderCtx<'_>, label: &str, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let required = bytes.len() as u64;
        if self.buffer.is_none() || required > self.capacity {
            let capacity = required.next_power_of_two().max(4096);
            self.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.capacity = capacity;
        }
        if let Some(buffer) = self.buffer.as_ref() {
            ctx.queue.write_buffer(buffer, 0, bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::paint::Color;

    fn img(w: u32, h: u32) -> Image {
        Image::from_rgba(image::RgbaImage::new(w, h))
    }

    fn plan(list: &DrawList) -> (Vec<FillInstance>, Vec<ImageInstance>, Vec<Batch>) {
        let (mut f, mut i, mut b) = (Vec::new(), Vec::new(), Vec::new());
        plan_batches(list.items(), &mut f, &mut i, &mut b);
        (f, i, b)
    }

    #[test]
    fn interleaved_kinds_keep_paint_order() {
        let a = img(2, 2);
        let mut list = DrawList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);
        list.draw_image(Rect::new(0.0, 0.0, 2.0, 2.0), &a);
        list.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::BLACK);

        let (fills, images, batches) = plan(&list);
        assert_eq!(fills.len(), 2);
        assert_eq!(images.len(), 1);
        assert_eq!(
            batches,
            vec![
                Batch::Fill(0..1),
                Batch::Image { id: a.id(), range: 0..1 },
                Batch::Fill(1..2),
            ]
        );
    }

    #[test]
    fn runs_merge_only_for_same_texture() {
        let (a, b) = (img(1, 1), img(1, 1));
        let mut list = DrawList::new();
        let r = Rect::new(0.0, 0.0, 1.0, 1.0);
        list.draw_image(r, &a);
        list.draw_image(r, &a);
        list.draw_image(r, &b);
        list.fill_rect(r, Color::WHITE);
        list.fill_rect(r, Color::WHITE);

        let (_, _, batches) = plan(&list);
        assert_eq!(
            batches,
            vec![
                Batch::Image { id: a.id(), range: 0..2 },
                Batch::Image { id: b.id(), range: 2..3 },
                Batch::Fill(0..2),
            ]
        );
    }

    #[test]
    fn degenerate_commands_are_skipped() {
        let mut list = DrawList::new();
        list.fill_rect(Rect::new(0.0, 0.0, 0.0, 5.0), Color::WHITE);
        list.draw_image(Rect::new(0.0, 0.0, 5.0, 5.0), &img(0, 3));
        let (fills, images, batches) = plan(&list);
        assert!(fills.is_empty() && images.is_empty() && batches.is_empty());
    }

    #[test]
    fn instance_carries_placement_columns() {
        let mut list = DrawList::new();
        list.translate(Vec2::new(5.0, 6.0));
        list.fill_rect(Rect::new(1.0, 1.0, 2.0, 3.0), Color::WHITE);
        let (fills, _, _) = plan(&list);
        assert_eq!(fills[0].xform, [[2.0, 0.0], [0.0, 3.0], [6.0, 7.0]]);
        assert_eq!(fills[0].color, [1.0, 1.0, 1.0, 1.0]);
    }
}
