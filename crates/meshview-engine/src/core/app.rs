use winit::event::WindowEvent;
use winit::window::WindowId;

use crate::device::Gpu;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
pub trait App {
    /// Called for raw window events, before the runtime handles them.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called after the surface has been resized. `width`/`height` are
    /// physical pixels and may be zero while the window is minimised.
    fn on_resize(&mut self, width: u32, height: u32, scale_factor: f64) {
        let _ = (width, height, scale_factor);
    }

    /// Called once per redraw.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Whether the runtime should keep scheduling redraws. When false the
    /// event loop sleeps until the next resize.
    fn wants_redraw(&self) -> bool {
        true
    }

    /// Called once before the window and its GPU context are dropped.
    /// GPU resources the app owns must be released here.
    fn on_teardown(&mut self, gpu: &Gpu<'_>) {
        let _ = gpu;
    }
}
