use crate::camera::PerspectiveCamera;
use crate::effects::EffectChain;
use crate::render::{Composer, MeshRenderer, RenderCtx, RenderTarget};
use crate::scene::SceneGraph;

/// Everything the viewer keeps on the GPU, drawn in one frame:
/// mesh into the scene target, then the effect chain onto the swapchain.
#[derive(Default)]
pub struct FrameRenderer {
    mesh: MeshRenderer,
    composer: Composer,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        scene: &mut SceneGraph,
        camera: &PerspectiveCamera,
        effects: &EffectChain,
    ) {
        self.composer.prepare(ctx.device, ctx.surface_format, effects);
        self.mesh.sync(ctx, scene, camera);

        let Some((color, depth)) = self.composer.scene_attachments() else {
            return;
        };
        self.mesh.render(target.encoder, color, depth, scene);

        self.composer
            .render(ctx.queue, target.encoder, effects, camera, target.color_view);
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Releases post-processing objects first, then mesh buffers.
    pub fn dispose(&mut self) {
        self.composer.dispose();
        self.mesh.dispose();
    }
}
