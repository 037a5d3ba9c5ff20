/// Offscreen color format for every intermediate target.
pub(crate) const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub(crate) struct RenderTexture {
    // Kept alive for the view.
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl RenderTexture {
    fn new(device: &wgpu::Device, label: &str, size: (u32, u32), format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size.0.max(1),
                height: size.1.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }
}

/// Which full-size color target a pass reads from or writes to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Buffer {
    Scene,
    Ping,
    Pong,
}

/// Every offscreen texture the composer renders through, at one size.
pub(crate) struct Targets {
    pub size: (u32, u32),
    pub scene: RenderTexture,
    pub depth: RenderTexture,
    pub ping: RenderTexture,
    pub pong: RenderTexture,
    /// Half-resolution bloom chain.
    pub bloom_a: RenderTexture,
    pub bloom_b: RenderTexture,
}

impl Targets {
    pub fn new(device: &wgpu::Device, size: (u32, u32)) -> Self {
        let half = bloom_size(size);
        log::debug!("post targets allocated at {}x{}", size.0, size.1);
        Self {
            size,
            scene: RenderTexture::new(device, "meshview scene color", size, HDR_FORMAT),
            depth: RenderTexture::new(device, "meshview scene depth", size, DEPTH_FORMAT),
            ping: RenderTexture::new(device, "meshview post ping", size, HDR_FORMAT),
            pong: RenderTexture::new(device, "meshview post pong", size, HDR_FORMAT),
            bloom_a: RenderTexture::new(device, "meshview bloom a", half, HDR_FORMAT),
            bloom_b: RenderTexture::new(device, "meshview bloom b", half, HDR_FORMAT),
        }
    }

    pub fn view(&self, buffer: Buffer) -> &wgpu::TextureView {
        match buffer {
            Buffer::Scene => &self.scene.view,
            Buffer::Ping => &self.ping.view,
            Buffer::Pong => &self.pong.view,
        }
    }
}

pub(crate) fn bloom_size(size: (u32, u32)) -> (u32, u32) {
    ((size.0 / 2).max(1), (size.1 / 2).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bloom_targets_are_half_size_and_never_empty() {
        assert_eq!(bloom_size((800, 600)), (400, 300));
        assert_eq!(bloom_size((1, 1)), (1, 1));
    }
}
