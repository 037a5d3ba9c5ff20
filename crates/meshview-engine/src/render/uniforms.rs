//! GPU uniform layouts. Every struct matches a WGSL struct in `shaders/` and
//! keeps 16-byte alignment.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::PerspectiveCamera;
use crate::effects::{BloomParams, ColorCorrectionParams, DepthOfFieldParams, VignetteParams};
use crate::scene::{MaterialMode, SceneGraph};

pub(crate) const FLAG_TEXTURED: u32 = 1;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct SceneUniform {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub base_color: [f32; 4],
    /// rgb premultiplied by intensity.
    pub ambient: [f32; 4],
    /// rgb premultiplied by intensity.
    pub point_color: [f32; 4],
    /// xyz position, w range.
    pub point_position: [f32; 4],
    pub flags: [u32; 4],
}

impl SceneUniform {
    pub fn new(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        let material = scene.material();
        let lights = scene.lights();
        let ambient = lights.ambient();
        let point = lights.point();
        let model: Mat4 = scene.mesh().transform().matrix();

        let textured = material.mode() == MaterialMode::Textured;
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            base_color: material.color().to_array4(1.0),
            ambient: ambient.color.scaled(ambient.intensity).to_array4(0.0),
            point_color: point.color.scaled(point.intensity).to_array4(0.0),
            point_position: point.position.extend(point.range).to_array(),
            flags: [if textured { FLAG_TEXTURED } else { 0 }, 0, 0, 0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct BloomUniform {
    /// 1 / bloom target size.
    pub texel: [f32; 2],
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
    pub _pad: [f32; 3],
}

impl BloomUniform {
    pub fn new(p: &BloomParams, size: (u32, u32)) -> Self {
        Self {
            texel: texel(size),
            strength: p.strength,
            radius: p.radius,
            threshold: p.threshold,
            _pad: [0.0; 3],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct VignetteUniform {
    pub darkness: f32,
    pub offset: f32,
    pub _pad: [f32; 2],
}

impl VignetteUniform {
    pub fn new(p: &VignetteParams) -> Self {
        Self {
            darkness: p.darkness,
            offset: p.offset,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct DofUniform {
    pub focus: f32,
    pub aperture: f32,
    pub max_blur: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub _pad: [f32; 2],
}

impl DofUniform {
    pub fn new(p: &DepthOfFieldParams, camera: &PerspectiveCamera) -> Self {
        Self {
            focus: p.focus_distance,
            aperture: p.aperture,
            max_blur: p.max_blur,
            aspect: camera.aspect,
            near: camera.near,
            far: camera.far,
            _pad: [0.0; 2],
        }
    }
}

/// `out = mul * pow(rgb + add, pow)` per channel.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct ColorCorrectionUniform {
    pub pow_rgb: [f32; 4],
    pub mul_rgb: [f32; 4],
    pub add_rgb: [f32; 4],
}

impl ColorCorrectionUniform {
    pub fn new(p: &ColorCorrectionParams) -> Self {
        Self {
            pow_rgb: [p.exposure, p.exposure, p.exposure, 1.0],
            mul_rgb: [p.saturation, p.saturation, p.saturation, 1.0],
            add_rgb: [0.0; 4],
        }
    }
}

fn texel(size: (u32, u32)) -> [f32; 2] {
    [1.0 / size.0.max(1) as f32, 1.0 / size.1.max(1) as f32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    #[test]
    fn uniform_sizes_match_wgsl() {
        assert_eq!(size_of::<SceneUniform>(), 224);
        assert_eq!(size_of::<BloomUniform>(), 32);
        assert_eq!(size_of::<VignetteUniform>(), 16);
        assert_eq!(size_of::<DofUniform>(), 32);
        assert_eq!(size_of::<ColorCorrectionUniform>(), 48);
    }

    #[test]
    fn scene_uniform_reflects_lights_and_material() {
        let scene = SceneGraph::default();
        let camera = PerspectiveCamera::default();
        let u = SceneUniform::new(&scene, &camera);

        assert_eq!(u.base_color, [1.0, 0.5, 0.5, 1.0]);
        assert_eq!(u.ambient, [0.5, 0.5, 0.5, 0.0]);
        assert_eq!(u.point_position, [10.0, 10.0, 10.0, 100.0]);
        assert_eq!(u.flags[0], 0);
    }

    #[test]
    fn color_correction_maps_exposure_to_power() {
        let u = ColorCorrectionUniform::new(&ColorCorrectionParams {
            exposure: 2.0,
            saturation: 0.5,
        });
        assert_eq!(u.pow_rgb[0], 2.0);
        assert_eq!(u.mul_rgb[2], 0.5);
    }
}
