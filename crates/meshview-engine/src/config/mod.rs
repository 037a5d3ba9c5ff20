//! Inbound viewer configuration: everything the surrounding UI can change.
//!
//! The UI hands over a whole [`ViewerConfig`] on every change;
//! [`ViewerConfig::diff`] tells the viewer which subsystems actually need
//! patching.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::effects::{
    BloomParams,
    ColorCorrectionParams,
    DepthOfFieldParams,
    Look,
    VignetteParams,
};
use crate::error::ViewerError;
use crate::paint::Rgb;
use crate::scene::LightState;

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointPosition {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for PointPosition {
    fn default() -> Self {
        Self {
            x: 10.0,
            y: 10.0,
            z: 10.0,
        }
    }
}

impl From<PointPosition> for Vec3 {
    fn from(p: PointPosition) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    pub effect: Look,
    pub color: Rgb,
    pub wireframe: bool,
    pub ambient_intensity: f32,
    pub point_intensity: f32,
    pub point_position: PointPosition,
    pub bloom: BloomParams,
    pub vignette: VignetteParams,
    pub depth_of_field: DepthOfFieldParams,
    pub color_correction: ColorCorrectionParams,
    pub rotating: bool,
    /// Base64-encoded PNG texture map. `None` means solid color.
    pub texture: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            effect: Look::None,
            color: Rgb::new(1.0, 0.5, 0.5),
            wireframe: false,
            ambient_intensity: 0.5,
            point_intensity: 1.0,
            point_position: PointPosition::default(),
            bloom: BloomParams::default(),
            vignette: VignetteParams::default(),
            depth_of_field: DepthOfFieldParams::default(),
            color_correction: ColorCorrectionParams::default(),
            rotating: true,
            texture: None,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        serde_json::from_str(json).map_err(|e| ViewerError::Config(e.to_string()))
    }

    pub fn light_state(&self) -> LightState {
        LightState {
            ambient_intensity: self.ambient_intensity,
            point_intensity: self.point_intensity,
            point_position: self.point_position.into(),
        }
    }

    /// Subsystems whose inputs differ between `previous` and `self`.
    pub fn diff(&self, previous: &ViewerConfig) -> ConfigChanges {
        ConfigChanges {
            look: self.effect != previous.effect,
            material: self.color != previous.color || self.wireframe != previous.wireframe,
            texture: self.texture != previous.texture,
            lighting: self.light_state() != previous.light_state(),
            bloom: self.bloom != previous.bloom,
            vignette: self.vignette != previous.vignette,
            depth_of_field: self.depth_of_field != previous.depth_of_field,
            color_correction: self.color_correction != previous.color_correction,
            rotation: self.rotating != previous.rotating,
        }
    }
}

/// Per-subsystem change flags produced by [`ViewerConfig::diff`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ConfigChanges {
    pub look: bool,
    pub material: bool,
    pub texture: bool,
    pub lighting: bool,
    pub bloom: bool,
    pub vignette: bool,
    pub depth_of_field: bool,
    pub color_correction: bool,
    pub rotation: bool,
}

impl ConfigChanges {
    /// Every flag set; used for the first config a viewer sees.
    pub fn all() -> Self {
        Self {
            look: true,
            material: true,
            texture: true,
            lighting: true,
            bloom: true,
            vignette: true,
            depth_of_field: true,
            color_correction: true,
            rotation: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let cfg = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ViewerConfig::default());
        assert!(cfg.rotating);
        assert_eq!(cfg.color, Rgb::new(1.0, 0.5, 0.5));
    }

    #[test]
    fn parses_camel_case_fields() {
        let cfg = ViewerConfig::from_json(
            r#"{
                "effect": "bokeh",
                "ambientIntensity": 0.2,
                "pointPosition": {"x": 1, "y": 2, "z": 3},
                "depthOfField": {"maxBlur": 4.0},
                "colorCorrection": {"exposure": 2.0}
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.effect, Look::DepthOfField);
        assert_eq!(cfg.ambient_intensity, 0.2);
        assert_eq!(cfg.light_state().point_position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(cfg.depth_of_field.max_blur, 4.0);
        assert_eq!(cfg.color_correction.exposure, 2.0);
        assert_eq!(cfg.color_correction.saturation, 1.0);
    }

    #[test]
    fn partial_point_position_keeps_other_axes() {
        let cfg = ViewerConfig::from_json(r#"{"pointPosition": {"x": 1}}"#).unwrap();
        assert_eq!(cfg.light_state().point_position, Vec3::new(1.0, 10.0, 10.0));
    }

    #[test]
    fn unknown_effect_is_a_config_error() {
        let err = ViewerConfig::from_json(r#"{"effect": "sepia"}"#).unwrap_err();
        assert!(matches!(err, ViewerError::Config(_)));
    }

    #[test]
    fn diff_flags_only_changed_subsystems() {
        let before = ViewerConfig::default();
        let mut after = before.clone();
        after.wireframe = true;
        after.bloom.strength = 2.0;

        let changes = after.diff(&before);
        assert_eq!(
            changes,
            ConfigChanges {
                material: true,
                bloom: true,
                ..ConfigChanges::default()
            }
        );
        assert!(before.diff(&before).is_empty());
    }
}
