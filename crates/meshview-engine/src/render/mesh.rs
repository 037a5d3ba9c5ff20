use std::mem::size_of;

use wgpu::util::DeviceExt;

use crate::camera::PerspectiveCamera;
use crate::mesh::{MeshBuffer, MeshVertex};
use crate::render::post::{DEPTH_FORMAT, HDR_FORMAT};
use crate::render::uniforms::SceneUniform;
use crate::render::RenderCtx;
use crate::scene::{ResourceId, SceneGraph, TextureImage};

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

// ── uploaded resources ─────────────────────────────────────────────────────

struct GeometryBuffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_format: wgpu::IndexFormat,
    index_count: u32,
    edges: wgpu::Buffer,
    edge_count: u32,
}

/// GPU copy of one scene geometry. Empty meshes upload nothing.
struct GpuGeometry {
    id: ResourceId,
    buffers: Option<GeometryBuffers>,
}

impl GpuGeometry {
    fn upload(device: &wgpu::Device, id: ResourceId, mesh: &MeshBuffer) -> Self {
        if mesh.is_empty() {
            return Self { id, buffers: None };
        }

        let vertices = mesh.vertices();
        let edges = mesh.edge_indices();

        let buffers = GeometryBuffers {
            vertices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("meshview mesh vbo"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            indices: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("meshview mesh ibo"),
                contents: &mesh.indices().to_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_format: mesh.indices().format(),
            index_count: mesh.indices().len() as u32,
            edges: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("meshview mesh edges"),
                contents: bytemuck::cast_slice(&edges),
                usage: wgpu::BufferUsages::INDEX,
            }),
            edge_count: edges.len() as u32,
        };

        Self {
            id,
            buffers: Some(buffers),
        }
    }
}

struct GpuTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl GpuTexture {
    fn upload(ctx: &RenderCtx<'_>, label: &str, image: &TextureImage) -> Self {
        let image = image.fit_within(ctx.device.limits().max_texture_dimension_2d);
        let size = wgpu::Extent3d {
            width: image.width(),
            height: image.height(),
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
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
            image.rgba(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width() * 4),
                rows_per_image: Some(image.height()),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Draws the scene's mesh node into the offscreen scene target.
///
/// Mirrors the scene lazily: geometry and texture are uploaded when the
/// scene's resource ids change, and released ids are dropped afterwards, so
/// a frame always has something valid to draw.
#[derive(Default)]
pub struct MeshRenderer {
    fill_pipeline: Option<wgpu::RenderPipeline>,
    line_pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    uniform: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,
    white: Option<GpuTexture>,

    geometry: Option<GpuGeometry>,
    texture: Option<(ResourceId, GpuTexture)>,

    bind_group: Option<wgpu::BindGroup>,
    /// Texture id the bind group was built with; `None` means the fallback.
    bound_texture: Option<ResourceId>,
}

impl MeshRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the geometry currently resident on the GPU.
    pub fn geometry_id(&self) -> Option<ResourceId> {
        self.geometry.as_ref().map(|g| g.id)
    }

    /// Brings GPU state in line with `scene` and `camera`.
    pub fn sync(&mut self, ctx: &RenderCtx<'_>, scene: &mut SceneGraph, camera: &PerspectiveCamera) {
        self.ensure_pipelines(ctx);
        self.ensure_static_resources(ctx);

        let geometry = scene.mesh().geometry();
        if self.geometry_id() != Some(geometry.id()) {
            self.geometry = Some(GpuGeometry::upload(ctx.device, geometry.id(), geometry.buffer()));
        }

        let wanted = scene.material().texture().map(|(id, _)| id);
        match scene.material().texture() {
            Some((id, image)) if self.texture.as_ref().map(|(t, _)| *t) != Some(id) => {
                self.texture = Some((id, GpuTexture::upload(ctx, "meshview base map", image)));
            }
            None => self.texture = None,
            Some(_) => {}
        }

        if self.bind_group.is_none() || self.bound_texture != wanted {
            self.rebuild_bind_group(ctx);
        }

        if let Some(ubo) = self.uniform.as_ref() {
            let uniform = SceneUniform::new(scene, camera);
            ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&uniform));
        }

        // Replacements are resident now; drop whatever the scene let go of.
        let released = scene.resources_mut().drain_released();
        for id in released {
            if self.geometry_id() == Some(id) {
                self.geometry = None;
            }
            if self.texture.as_ref().map(|(t, _)| *t) == Some(id) {
                self.texture = None;
                self.bound_texture = None;
                self.bind_group = None;
            }
            log::trace!("gpu resource {} dropped", id.raw());
        }
    }

    /// Clears `color`/`depth` to the scene background and draws the mesh.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color: &wgpu::TextureView,
        depth: &wgpu::TextureView,
        scene: &SceneGraph,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("meshview mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(scene.background().to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let Some(buffers) = self.geometry.as_ref().and_then(|g| g.buffers.as_ref()) else {
            return;
        };
        let Some(bind_group) = self.bind_group.as_ref() else { return; };

        let wireframe = scene.material().wireframe();
        let pipeline = if wireframe { &self.line_pipeline } else { &self.fill_pipeline };
        let Some(pipeline) = pipeline.as_ref() else { return; };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, buffers.vertices.slice(..));
        if wireframe {
            rpass.set_index_buffer(buffers.edges.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..buffers.edge_count, 0, 0..1);
        } else {
            rpass.set_index_buffer(buffers.indices.slice(..), buffers.index_format);
            rpass.draw_indexed(0..buffers.index_count, 0, 0..1);
        }
    }

    /// Drops every GPU object this renderer owns.
    pub fn dispose(&mut self) {
        *self = Self::default();
        log::debug!("mesh renderer disposed");
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipelines(&mut self, ctx: &RenderCtx<'_>) {
        if self.fill_pipeline.is_some() && self.line_pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("meshview mesh shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/mesh.wgsl").into()),
        });

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("meshview mesh bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(size_of::<SceneUniform>() as u64),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("meshview mesh pipeline layout"),
            bind_group_layouts: &[&bgl],
            immediate_size: 0,
        });

        let make = |label: &str, topology: wgpu::PrimitiveTopology| {
            ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[MeshVertex::layout()],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology,
                    front_face: wgpu::FrontFace::Ccw,
                    // Procedural meshes have no reliable winding.
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
        };

        self.fill_pipeline = Some(make("meshview mesh fill", wgpu::PrimitiveTopology::TriangleList));
        self.line_pipeline = Some(make("meshview mesh wireframe", wgpu::PrimitiveTopology::LineList));
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
    }

    fn ensure_static_resources(&mut self, ctx: &RenderCtx<'_>) {
        if self.uniform.is_none() {
            self.uniform = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("meshview scene ubo"),
                size: size_of::<SceneUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            self.bind_group = None;
        }

        if self.sampler.is_none() {
            self.sampler = Some(ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("meshview mesh sampler"),
                address_mode_u: wgpu::AddressMode::Repeat,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            }));
            self.bind_group = None;
        }

        if self.white.is_none() {
            // Solid materials still bind a texture; the shader ignores it.
            let white = TextureImage::from_rgba(1, 1, vec![255; 4]);
            match white {
                Ok(image) => {
                    self.white = Some(GpuTexture::upload(ctx, "meshview white", &image));
                    self.bind_group = None;
                }
                Err(e) => log::error!("fallback texture: {e}"),
            }
        }
    }

    fn rebuild_bind_group(&mut self, ctx: &RenderCtx<'_>) {
        let (Some(layout), Some(ubo), Some(sampler)) =
            (self.bind_group_layout.as_ref(), self.uniform.as_ref(), self.sampler.as_ref())
        else {
            return;
        };

        let (bound, view) = match (&self.texture, &self.white) {
            (Some((id, tex)), _) => (Some(*id), &tex.view),
            (None, Some(white)) => (None, &white.view),
            (None, None) => return,
        };

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("meshview mesh bg"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        }));
        self.bound_texture = bound;
    }
}
