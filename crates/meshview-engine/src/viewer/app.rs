use crate::core::{App, AppControl, FrameCtx};
use crate::device::Gpu;
use crate::input::InputFrame;
use crate::render::FrameRenderer;

use super::state::Viewer;

/// Per-frame hook for whatever drives the viewer from outside: keyboard
/// shortcuts, a settings panel, a file watcher.
pub trait ViewerController {
    /// Called once per frame with this frame's input, before the viewer
    /// advances.
    fn update(&mut self, viewer: &mut Viewer, input: &InputFrame) -> AppControl {
        let _ = (viewer, input);
        AppControl::Continue
    }
}

impl ViewerController for () {}

/// Runs a [`Viewer`] inside the window runtime.
///
/// Owns the GPU side ([`FrameRenderer`]) next to the CPU state and tears both
/// down in dependency order when the window closes.
pub struct ViewerApp<C = ()> {
    viewer: Viewer,
    renderer: FrameRenderer,
    controller: C,
}

impl<C: ViewerController> ViewerApp<C> {
    pub fn new(viewer: Viewer, controller: C) -> Self {
        Self {
            viewer,
            renderer: FrameRenderer::new(),
            controller,
        }
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }
}

impl<C: ViewerController> App for ViewerApp<C> {
    fn on_resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        self.viewer.resize(width, height, scale_factor);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        for event in &ctx.input_frame.events {
            self.viewer.handle_input(event);
        }

        if self.controller.update(&mut self.viewer, ctx.input_frame) == AppControl::Exit {
            return AppControl::Exit;
        }

        if !self.viewer.tick() {
            return AppControl::Continue;
        }

        let renderer = &mut self.renderer;
        let (scene, camera, effects) = self.viewer.frame_parts();
        let result = ctx.render(|rctx, target| {
            renderer.render(rctx, target, scene, camera, effects);
        });
        self.viewer.report_frame(result);

        AppControl::Continue
    }

    fn wants_redraw(&self) -> bool {
        self.viewer.wants_redraw()
    }

    fn on_teardown(&mut self, gpu: &Gpu<'_>) {
        let info = gpu.adapter_info();
        self.viewer.stop();
        self.renderer.dispose();
        self.viewer.dispose();
        log::info!("viewer resources released on {}", info.name);
    }
}
