use serde::{Deserialize, Serialize};

/// Clamps `value` into `[lo, hi]`, logging when it had to move.
/// Non-finite input falls back to `default`.
fn clamp_param(name: &str, value: f32, lo: f32, hi: f32, default: f32) -> f32 {
    if !value.is_finite() {
        log::debug!("{name} = {value} is not finite; using {default}");
        return default;
    }
    let clamped = value.clamp(lo, hi);
    if clamped != value {
        log::debug!("{name} = {value} outside [{lo}, {hi}]; clamped to {clamped}");
    }
    clamped
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BloomParams {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl Default for BloomParams {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.4,
            threshold: 0.85,
        }
    }
}

impl BloomParams {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            strength: clamp_param("bloom.strength", self.strength, 0.1, 3.0, d.strength),
            radius: clamp_param("bloom.radius", self.radius, 0.1, 2.0, d.radius),
            threshold: clamp_param("bloom.threshold", self.threshold, 0.1, 1.0, d.threshold),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VignetteParams {
    pub darkness: f32,
    pub offset: f32,
}

impl Default for VignetteParams {
    fn default() -> Self {
        Self {
            darkness: 1.5,
            offset: 1.0,
        }
    }
}

impl VignetteParams {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            darkness: clamp_param("vignette.darkness", self.darkness, 0.1, 3.0, d.darkness),
            offset: clamp_param("vignette.offset", self.offset, 0.0, 3.0, d.offset),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DepthOfFieldParams {
    /// Focus distance from the camera, in world units.
    pub focus_distance: f32,
    pub aperture: f32,
    pub max_blur: f32,
}

impl Default for DepthOfFieldParams {
    fn default() -> Self {
        Self {
            focus_distance: 1.0,
            aperture: 0.025,
            max_blur: 1.0,
        }
    }
}

impl DepthOfFieldParams {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            focus_distance: clamp_param("dof.focusDistance", self.focus_distance, 0.1, 5.0, d.focus_distance),
            aperture: clamp_param("dof.aperture", self.aperture, 0.001, 0.1, d.aperture),
            max_blur: clamp_param("dof.maxBlur", self.max_blur, 0.1, 10.0, d.max_blur),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorCorrectionParams {
    /// Per-channel power.
    pub exposure: f32,
    /// Per-channel multiplier.
    pub saturation: f32,
}

impl Default for ColorCorrectionParams {
    fn default() -> Self {
        Self {
            exposure: 1.0,
            saturation: 1.0,
        }
    }
}

impl ColorCorrectionParams {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            exposure: clamp_param("colorCorrection.exposure", self.exposure, 0.1, 3.0, d.exposure),
            saturation: clamp_param("colorCorrection.saturation", self.saturation, 0.1, 3.0, d.saturation),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PassKind {
    Bloom,
    Vignette,
    DepthOfField,
    ColorCorrection,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PassParams {
    Bloom(BloomParams),
    Vignette(VignetteParams),
    DepthOfField(DepthOfFieldParams),
    ColorCorrection(ColorCorrectionParams),
}

impl PassParams {
    pub fn kind(&self) -> PassKind {
        match self {
            PassParams::Bloom(_) => PassKind::Bloom,
            PassParams::Vignette(_) => PassKind::Vignette,
            PassParams::DepthOfField(_) => PassKind::DepthOfField,
            PassParams::ColorCorrection(_) => PassKind::ColorCorrection,
        }
    }

    fn clamped(self) -> Self {
        match self {
            PassParams::Bloom(p) => PassParams::Bloom(p.clamped()),
            PassParams::Vignette(p) => PassParams::Vignette(p.clamped()),
            PassParams::DepthOfField(p) => PassParams::DepthOfField(p.clamped()),
            PassParams::ColorCorrection(p) => PassParams::ColorCorrection(p.clamped()),
        }
    }
}

/// One stage of the post-processing chain.
///
/// `revision` bumps on every effective parameter change, never on enable
/// flips.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectPass {
    params: PassParams,
    enabled: bool,
    revision: u64,
}

impl EffectPass {
    pub fn new(params: PassParams, enabled: bool) -> Self {
        Self {
            params: params.clamped(),
            enabled,
            revision: 0,
        }
    }

    pub fn kind(&self) -> PassKind {
        self.params.kind()
    }

    pub fn params(&self) -> &PassParams {
        &self.params
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Patches params in place. Returns false when unchanged after clamping.
    ///
    /// Params of a different kind are rejected.
    pub(crate) fn set_params(&mut self, params: PassParams) -> bool {
        if params.kind() != self.kind() {
            log::warn!("ignoring {:?} params for {:?} pass", params.kind(), self.kind());
            return false;
        }
        let params = params.clamped();
        if params == self.params {
            return false;
        }
        self.params = params;
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_params_clamp() {
        let p = BloomParams {
            strength: 10.0,
            radius: 0.0,
            threshold: f32::NAN,
        }
        .clamped();
        assert_eq!(p.strength, 3.0);
        assert_eq!(p.radius, 0.1);
        assert_eq!(p.threshold, 0.85);
    }

    #[test]
    fn set_params_bumps_revision_only_on_change() {
        let mut pass = EffectPass::new(PassParams::Vignette(VignetteParams::default()), false);
        assert!(!pass.set_params(PassParams::Vignette(VignetteParams::default())));
        assert!(pass.set_params(PassParams::Vignette(VignetteParams {
            darkness: 2.0,
            ..VignetteParams::default()
        })));
        assert_eq!(pass.revision(), 1);

        pass.set_enabled(true);
        assert_eq!(pass.revision(), 1);
    }

    #[test]
    fn mismatched_params_are_rejected() {
        let mut pass = EffectPass::new(PassParams::Bloom(BloomParams::default()), false);
        assert!(!pass.set_params(PassParams::ColorCorrection(ColorCorrectionParams::default())));
        assert_eq!(pass.kind(), PassKind::Bloom);
    }

    #[test]
    fn params_deserialize_camel_case_with_defaults() {
        let p: DepthOfFieldParams = serde_json::from_str(r#"{"focusDistance": 2.5}"#).unwrap();
        assert_eq!(p.focus_distance, 2.5);
        assert_eq!(p.aperture, 0.025);
    }
}
