use crate::camera::PerspectiveCamera;

/// What a [`ViewportState::resize`] call did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ResizeOutcome {
    /// New size applied; dependents must follow.
    Resized,
    /// Zero-sized (minimised); the last valid size and aspect are kept.
    Minimized,
    Unchanged,
}

/// Camera and surface geometry of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    camera: PerspectiveCamera,
    /// Last drawable size in physical pixels; never zero.
    size: (u32, u32),
    scale_factor: f64,
    minimized: bool,
}

impl ViewportState {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        let minimized = width == 0 || height == 0;
        let size = if minimized { (1, 1) } else { (width, height) };
        Self {
            camera: PerspectiveCamera::with_aspect(size.0, size.1),
            size,
            scale_factor: sanitize_scale(scale_factor),
            minimized,
        }
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut PerspectiveCamera {
        &mut self.camera
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Size in logical pixels, as pointer events report positions.
    pub fn logical_size(&self) -> (f32, f32) {
        let scale = self.scale_factor as f32;
        (self.size.0 as f32 / scale, self.size.1 as f32 / scale)
    }

    /// Applies a surface size in physical pixels and updates the camera
    /// aspect to match.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> ResizeOutcome {
        if width == 0 || height == 0 {
            let changed = !self.minimized;
            self.minimized = true;
            return if changed {
                ResizeOutcome::Minimized
            } else {
                ResizeOutcome::Unchanged
            };
        }

        let scale_factor = sanitize_scale(scale_factor);
        if !self.minimized && self.size == (width, height) && self.scale_factor == scale_factor {
            return ResizeOutcome::Unchanged;
        }

        self.minimized = false;
        self.size = (width, height);
        self.scale_factor = scale_factor;
        self.camera.set_aspect(width, height);
        ResizeOutcome::Resized
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 { scale } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_updates_camera_aspect() {
        let mut viewport = ViewportState::new(800, 600, 1.0);
        assert_eq!(viewport.camera().aspect, 800.0 / 600.0);

        assert_eq!(viewport.resize(400, 300, 1.0), ResizeOutcome::Resized);
        assert_eq!(viewport.size(), (400, 300));
        assert_eq!(viewport.camera().aspect, 400.0 / 300.0);

        assert_eq!(viewport.resize(400, 300, 1.0), ResizeOutcome::Unchanged);
    }

    #[test]
    fn minimise_keeps_last_valid_state() {
        let mut viewport = ViewportState::new(800, 600, 2.0);
        assert_eq!(viewport.resize(0, 0, 2.0), ResizeOutcome::Minimized);
        assert_eq!(viewport.resize(0, 600, 2.0), ResizeOutcome::Unchanged);
        assert!(viewport.is_minimized());
        assert_eq!(viewport.size(), (800, 600));
        assert_eq!(viewport.camera().aspect, 800.0 / 600.0);

        // Restoring to the same size still counts as a resize.
        assert_eq!(viewport.resize(800, 600, 2.0), ResizeOutcome::Resized);
        assert!(!viewport.is_minimized());
    }

    #[test]
    fn logical_size_divides_by_scale() {
        let viewport = ViewportState::new(800, 600, 2.0);
        assert_eq!(viewport.logical_size(), (400.0, 300.0));

        let bogus = ViewportState::new(800, 600, f64::NAN);
        assert_eq!(bogus.scale_factor(), 1.0);
    }
}
