use std::mem::size_of;

use crate::camera::PerspectiveCamera;
use crate::effects::{EffectChain, PassKind, PassParams};
use crate::render::uniforms::{BloomUniform, ColorCorrectionUniform, DofUniform, VignetteUniform};

use super::fullscreen::{self, Binding, Slot};
use super::targets::{bloom_size, Buffer, Targets, HDR_FORMAT};

/// Which passes run this frame and which buffer each one reads and writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct Plan {
    /// The exclusive look pass; it reads `Scene` and writes `Ping`.
    pub look: Option<PassKind>,
    /// Color correction input and output.
    pub correction: Option<(Buffer, Buffer)>,
    /// Buffer copied to the swapchain.
    pub present: Buffer,
}

impl Plan {
    pub fn for_chain(chain: &EffectChain) -> Self {
        let look = chain.look().pass_kind();
        let mut current = if look.is_some() { Buffer::Ping } else { Buffer::Scene };

        let correction = if chain.is_enabled(PassKind::ColorCorrection) {
            let output = match current {
                Buffer::Ping => Buffer::Pong,
                _ => Buffer::Ping,
            };
            let io = (current, output);
            current = output;
            Some(io)
        } else {
            None
        };

        Self {
            look,
            correction,
            present: current,
        }
    }
}

struct Pipelines {
    bloom_layout: wgpu::BindGroupLayout,
    effect_layout: wgpu::BindGroupLayout,
    dof_layout: wgpu::BindGroupLayout,
    present_layout: wgpu::BindGroupLayout,

    bright: wgpu::RenderPipeline,
    blur_h: wgpu::RenderPipeline,
    blur_v: wgpu::RenderPipeline,
    composite: wgpu::RenderPipeline,
    vignette: wgpu::RenderPipeline,
    dof: wgpu::RenderPipeline,
    color_correction: wgpu::RenderPipeline,

    present_format: wgpu::TextureFormat,
    present: wgpu::RenderPipeline,
}

impl Pipelines {
    fn new(device: &wgpu::Device, present_format: wgpu::TextureFormat) -> Self {
        let bloom_layout = fullscreen::bind_group_layout(
            device,
            "meshview bloom bgl",
            &[
                Slot::Uniform(size_of::<BloomUniform>() as u64),
                Slot::Color,
                Slot::Color,
                Slot::Sampler,
            ],
        );
        // Vignette and color correction uniforms differ in size; validate at
        // draw time instead of in the layout.
        let effect_layout = fullscreen::bind_group_layout(
            device,
            "meshview effect bgl",
            &[Slot::Uniform(0), Slot::Color, Slot::Sampler],
        );
        let dof_layout = fullscreen::bind_group_layout(
            device,
            "meshview dof bgl",
            &[
                Slot::Uniform(size_of::<DofUniform>() as u64),
                Slot::Color,
                Slot::Depth,
                Slot::Sampler,
            ],
        );
        let present_layout = fullscreen::bind_group_layout(
            device,
            "meshview present bgl",
            &[Slot::Color, Slot::Sampler],
        );

        let bloom = fullscreen::shader(device, "meshview bloom shader", include_str!("../shaders/bloom.wgsl"));
        let vignette = fullscreen::shader(device, "meshview vignette shader", include_str!("../shaders/vignette.wgsl"));
        let dof = fullscreen::shader(device, "meshview dof shader", include_str!("../shaders/dof.wgsl"));
        let cc = fullscreen::shader(
            device,
            "meshview color correction shader",
            include_str!("../shaders/color_correction.wgsl"),
        );
        let present = fullscreen::shader(device, "meshview present shader", include_str!("../shaders/present.wgsl"));

        let hdr = |label: &str, module: &wgpu::ShaderModule, entry: &str, layout: &wgpu::BindGroupLayout| {
            fullscreen::pipeline(device, label, module, entry, layout, HDR_FORMAT)
        };

        Self {
            bright: hdr("meshview bloom bright", &bloom, "fs_bright", &bloom_layout),
            blur_h: hdr("meshview bloom blur h", &bloom, "fs_blur_h", &bloom_layout),
            blur_v: hdr("meshview bloom blur v", &bloom, "fs_blur_v", &bloom_layout),
            composite: hdr("meshview bloom composite", &bloom, "fs_composite", &bloom_layout),
            vignette: hdr("meshview vignette", &vignette, "fs_main", &effect_layout),
            dof: hdr("meshview dof", &dof, "fs_main", &dof_layout),
            color_correction: hdr("meshview color correction", &cc, "fs_main", &effect_layout),
            present: fullscreen::pipeline(
                device,
                "meshview present",
                &present,
                "fs_main",
                &present_layout,
                present_format,
            ),
            present_format,
            bloom_layout,
            effect_layout,
            dof_layout,
            present_layout,
        }
    }
}

struct Uniforms {
    bloom: wgpu::Buffer,
    vignette: wgpu::Buffer,
    dof: wgpu::Buffer,
    color_correction: wgpu::Buffer,

    // Last uploaded values; a pass uploads only when its value differs.
    last_bloom: Option<BloomUniform>,
    last_vignette: Option<VignetteUniform>,
    last_dof: Option<DofUniform>,
    last_color_correction: Option<ColorCorrectionUniform>,
}

impl Uniforms {
    fn new(device: &wgpu::Device) -> Self {
        let buffer = |label: &str, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        Self {
            bloom: buffer("meshview bloom ubo", size_of::<BloomUniform>()),
            vignette: buffer("meshview vignette ubo", size_of::<VignetteUniform>()),
            dof: buffer("meshview dof ubo", size_of::<DofUniform>()),
            color_correction: buffer("meshview color correction ubo", size_of::<ColorCorrectionUniform>()),
            last_bloom: None,
            last_vignette: None,
            last_dof: None,
            last_color_correction: None,
        }
    }
}

fn upload<T: bytemuck::Pod + PartialEq>(
    queue: &wgpu::Queue,
    buffer: &wgpu::Buffer,
    last: &mut Option<T>,
    value: T,
) {
    if last.as_ref() == Some(&value) {
        return;
    }
    queue.write_buffer(buffer, 0, bytemuck::bytes_of(&value));
    *last = Some(value);
}

/// Bind groups over the current targets. Rebuilt whenever targets are.
struct BindGroups {
    bright: wgpu::BindGroup,
    blur_h: wgpu::BindGroup,
    blur_v: wgpu::BindGroup,
    composite: wgpu::BindGroup,
    vignette: wgpu::BindGroup,
    dof: wgpu::BindGroup,
    cc_from_scene: wgpu::BindGroup,
    cc_from_ping: wgpu::BindGroup,
    present_scene: wgpu::BindGroup,
    present_ping: wgpu::BindGroup,
    present_pong: wgpu::BindGroup,
}

impl BindGroups {
    fn new(
        device: &wgpu::Device,
        p: &Pipelines,
        u: &Uniforms,
        t: &Targets,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let bloom = |label: &str, src: &wgpu::TextureView, aux: &wgpu::TextureView| {
            fullscreen::bind_group(
                device,
                label,
                &p.bloom_layout,
                &[
                    Binding::Buffer(&u.bloom),
                    Binding::View(src),
                    Binding::View(aux),
                    Binding::Sampler(sampler),
                ],
            )
        };
        let effect = |label: &str, ubo: &wgpu::Buffer, src: &wgpu::TextureView| {
            fullscreen::bind_group(
                device,
                label,
                &p.effect_layout,
                &[Binding::Buffer(ubo), Binding::View(src), Binding::Sampler(sampler)],
            )
        };
        let present = |label: &str, src: &wgpu::TextureView| {
            fullscreen::bind_group(
                device,
                label,
                &p.present_layout,
                &[Binding::View(src), Binding::Sampler(sampler)],
            )
        };

        Self {
            bright: bloom("meshview bloom bright bg", &t.scene.view, &t.scene.view),
            blur_h: bloom("meshview bloom blur h bg", &t.bloom_a.view, &t.bloom_a.view),
            blur_v: bloom("meshview bloom blur v bg", &t.bloom_b.view, &t.bloom_b.view),
            composite: bloom("meshview bloom composite bg", &t.scene.view, &t.bloom_a.view),
            vignette: effect("meshview vignette bg", &u.vignette, &t.scene.view),
            dof: fullscreen::bind_group(
                device,
                "meshview dof bg",
                &p.dof_layout,
                &[
                    Binding::Buffer(&u.dof),
                    Binding::View(&t.scene.view),
                    Binding::View(&t.depth.view),
                    Binding::Sampler(sampler),
                ],
            ),
            cc_from_scene: effect("meshview cc scene bg", &u.color_correction, &t.scene.view),
            cc_from_ping: effect("meshview cc ping bg", &u.color_correction, &t.ping.view),
            present_scene: present("meshview present scene bg", &t.scene.view),
            present_ping: present("meshview present ping bg", &t.ping.view),
            present_pong: present("meshview present pong bg", &t.pong.view),
        }
    }

    fn present(&self, buffer: Buffer) -> &wgpu::BindGroup {
        match buffer {
            Buffer::Scene => &self.present_scene,
            Buffer::Ping => &self.present_ping,
            Buffer::Pong => &self.present_pong,
        }
    }

    fn color_correction(&self, input: Buffer) -> &wgpu::BindGroup {
        match input {
            Buffer::Ping => &self.cc_from_ping,
            _ => &self.cc_from_scene,
        }
    }
}

/// GPU side of the effect chain.
///
/// Owns the offscreen targets the mesh is rendered into, and runs the enabled
/// passes from there to the swapchain. Everything is created lazily on first
/// use and follows the chain's size.
#[derive(Default)]
pub struct Composer {
    sampler: Option<wgpu::Sampler>,
    pipelines: Option<Pipelines>,
    uniforms: Option<Uniforms>,
    targets: Option<Targets>,
    bind_groups: Option<BindGroups>,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the allocated targets, if any.
    pub fn size(&self) -> Option<(u32, u32)> {
        self.targets.as_ref().map(|t| t.size)
    }

    /// Creates or resizes GPU objects to match `chain` and `surface_format`.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        chain: &EffectChain,
    ) {
        let sampler = self.sampler.get_or_insert_with(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("meshview post sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                ..Default::default()
            })
        });

        let mut rebind = false;

        if self.pipelines.as_ref().map(|p| p.present_format) != Some(surface_format) {
            self.pipelines = Some(Pipelines::new(device, surface_format));
            rebind = true;
        }

        if self.uniforms.is_none() {
            self.uniforms = Some(Uniforms::new(device));
            rebind = true;
        }

        let size = chain.size();
        if self.targets.as_ref().map(|t| t.size) != Some(size) {
            self.targets = Some(Targets::new(device, size));
            rebind = true;
        }

        if rebind || self.bind_groups.is_none() {
            if let (Some(p), Some(u), Some(t)) = (&self.pipelines, &self.uniforms, &self.targets) {
                self.bind_groups = Some(BindGroups::new(device, p, u, t, sampler));
            }
        }
    }

    /// Color and depth views the base render writes to.
    pub fn scene_attachments(&self) -> Option<(&wgpu::TextureView, &wgpu::TextureView)> {
        self.targets.as_ref().map(|t| (&t.scene.view, &t.depth.view))
    }

    /// Runs the enabled passes and writes the result to `output`.
    ///
    /// Call after [`prepare`](Self::prepare) and after the scene has been
    /// rendered into [`scene_attachments`](Self::scene_attachments).
    pub fn render(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        chain: &EffectChain,
        camera: &PerspectiveCamera,
        output: &wgpu::TextureView,
    ) {
        let (Some(p), Some(u), Some(t), Some(bg)) = (
            self.pipelines.as_ref(),
            self.uniforms.as_mut(),
            self.targets.as_ref(),
            self.bind_groups.as_ref(),
        ) else {
            return;
        };

        let plan = Plan::for_chain(chain);

        for stage in chain.stages() {
            match stage.params() {
                PassParams::Bloom(b) => {
                    let value = BloomUniform::new(b, bloom_size(t.size));
                    upload(queue, &u.bloom, &mut u.last_bloom, value);
                }
                PassParams::Vignette(v) => {
                    upload(queue, &u.vignette, &mut u.last_vignette, VignetteUniform::new(v));
                }
                PassParams::DepthOfField(d) => {
                    upload(queue, &u.dof, &mut u.last_dof, DofUniform::new(d, camera));
                }
                PassParams::ColorCorrection(c) => {
                    let value = ColorCorrectionUniform::new(c);
                    upload(queue, &u.color_correction, &mut u.last_color_correction, value);
                }
            }
        }

        match plan.look {
            Some(PassKind::Bloom) => {
                fullscreen::draw(encoder, "meshview bloom bright", &p.bright, &bg.bright, &t.bloom_a.view);
                fullscreen::draw(encoder, "meshview bloom blur h", &p.blur_h, &bg.blur_h, &t.bloom_b.view);
                fullscreen::draw(encoder, "meshview bloom blur v", &p.blur_v, &bg.blur_v, &t.bloom_a.view);
                fullscreen::draw(encoder, "meshview bloom composite", &p.composite, &bg.composite, &t.ping.view);
            }
            Some(PassKind::Vignette) => {
                fullscreen::draw(encoder, "meshview vignette", &p.vignette, &bg.vignette, &t.ping.view);
            }
            Some(PassKind::DepthOfField) => {
                fullscreen::draw(encoder, "meshview dof", &p.dof, &bg.dof, &t.ping.view);
            }
            Some(PassKind::ColorCorrection) | None => {}
        }

        if let Some((input, output_buffer)) = plan.correction {
            fullscreen::draw(
                encoder,
                "meshview color correction",
                &p.color_correction,
                bg.color_correction(input),
                t.view(output_buffer),
            );
        }

        fullscreen::draw(encoder, "meshview present", &p.present, bg.present(plan.present), output);
    }

    /// Drops every GPU object. The next `prepare` recreates them.
    pub fn dispose(&mut self) {
        self.bind_groups = None;
        self.targets = None;
        self.uniforms = None;
        self.pipelines = None;
        self.sampler = None;
        log::debug!("composer disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Look;

    #[test]
    fn no_look_corrects_scene_into_ping() {
        let chain = EffectChain::new(800, 600);
        let plan = Plan::for_chain(&chain);
        assert_eq!(plan.look, None);
        assert_eq!(plan.correction, Some((Buffer::Scene, Buffer::Ping)));
        assert_eq!(plan.present, Buffer::Ping);
    }

    #[test]
    fn look_output_feeds_color_correction() {
        for look in [Look::Bloom, Look::Vignette, Look::DepthOfField] {
            let mut chain = EffectChain::new(800, 600);
            chain.select_look(look);
            let plan = Plan::for_chain(&chain);
            assert_eq!(plan.look, look.pass_kind());
            assert_eq!(plan.correction, Some((Buffer::Ping, Buffer::Pong)));
            assert_eq!(plan.present, Buffer::Pong);
        }
    }
}
