use glam::{Mat4, Vec3};

/// Right-handed perspective camera looking at `target`.
///
/// Projection maps depth to wgpu's 0..1 range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov_y: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl PerspectiveCamera {
    pub fn with_aspect(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(width, height);
        camera
    }

    /// Updates the aspect ratio. A zero dimension keeps the previous value.
    pub fn set_aspect(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// False when the position is non-finite or collapsed onto the target.
    pub fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.target.is_finite()
            && self.aspect.is_finite()
            && self.distance() > f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_camera() {
        let cam = PerspectiveCamera::default();
        assert_eq!(cam.fov_y, 75.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 1000.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn zero_height_keeps_aspect() {
        let mut cam = PerspectiveCamera::with_aspect(800, 600);
        assert!(!cam.set_aspect(800, 0));
        assert!((cam.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn target_projects_to_center() {
        let cam = PerspectiveCamera::with_aspect(800, 600);
        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn nan_position_is_invalid() {
        let cam = PerspectiveCamera {
            position: Vec3::new(f32::NAN, 0.0, 0.0),
            ..PerspectiveCamera::default()
        };
        assert!(!cam.is_valid());
    }
}
