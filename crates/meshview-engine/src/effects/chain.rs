use serde::{Deserialize, Serialize};

use super::pass::{
    BloomParams,
    ColorCorrectionParams,
    DepthOfFieldParams,
    EffectPass,
    PassKind,
    PassParams,
    VignetteParams,
};

/// The exclusive "look" stage between the base render and color correction.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Look {
    #[default]
    None,
    Bloom,
    Vignette,
    #[serde(alias = "bokeh", alias = "dof")]
    DepthOfField,
}

impl Look {
    pub fn pass_kind(self) -> Option<PassKind> {
        match self {
            Look::None => None,
            Look::Bloom => Some(PassKind::Bloom),
            Look::Vignette => Some(PassKind::Vignette),
            Look::DepthOfField => Some(PassKind::DepthOfField),
        }
    }
}

/// Ordered post-processing passes: look (at most one) then color correction.
///
/// This is configuration only; the GPU composer reads it each frame.
#[derive(Debug, Clone)]
pub struct EffectChain {
    bloom: EffectPass,
    vignette: EffectPass,
    depth_of_field: EffectPass,
    color_correction: EffectPass,
    size: (u32, u32),
    disposed: bool,
}

impl EffectChain {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bloom: EffectPass::new(PassParams::Bloom(BloomParams::default()), false),
            vignette: EffectPass::new(PassParams::Vignette(VignetteParams::default()), false),
            depth_of_field: EffectPass::new(
                PassParams::DepthOfField(DepthOfFieldParams::default()),
                false,
            ),
            color_correction: EffectPass::new(
                PassParams::ColorCorrection(ColorCorrectionParams::default()),
                true,
            ),
            size: (width.max(1), height.max(1)),
            disposed: false,
        }
    }

    /// Disables every look pass, then enables the one `look` names.
    ///
    /// Returns true if the active look changed.
    pub fn select_look(&mut self, look: Look) -> bool {
        if self.look() == look {
            return false;
        }
        self.bloom.set_enabled(false);
        self.vignette.set_enabled(false);
        self.depth_of_field.set_enabled(false);
        if let Some(kind) = look.pass_kind() {
            self.pass_mut(kind).set_enabled(true);
        }
        log::debug!("effect look -> {look:?}");
        true
    }

    pub fn look(&self) -> Look {
        if self.bloom.enabled() {
            Look::Bloom
        } else if self.vignette.enabled() {
            Look::Vignette
        } else if self.depth_of_field.enabled() {
            Look::DepthOfField
        } else {
            Look::None
        }
    }

    pub fn set_bloom(&mut self, params: BloomParams) -> bool {
        self.bloom.set_params(PassParams::Bloom(params))
    }

    pub fn set_vignette(&mut self, params: VignetteParams) -> bool {
        self.vignette.set_params(PassParams::Vignette(params))
    }

    pub fn set_depth_of_field(&mut self, params: DepthOfFieldParams) -> bool {
        self.depth_of_field
            .set_params(PassParams::DepthOfField(params))
    }

    pub fn set_color_correction(&mut self, params: ColorCorrectionParams) -> bool {
        self.color_correction
            .set_params(PassParams::ColorCorrection(params))
    }

    pub fn pass(&self, kind: PassKind) -> &EffectPass {
        match kind {
            PassKind::Bloom => &self.bloom,
            PassKind::Vignette => &self.vignette,
            PassKind::DepthOfField => &self.depth_of_field,
            PassKind::ColorCorrection => &self.color_correction,
        }
    }

    fn pass_mut(&mut self, kind: PassKind) -> &mut EffectPass {
        match kind {
            PassKind::Bloom => &mut self.bloom,
            PassKind::Vignette => &mut self.vignette,
            PassKind::DepthOfField => &mut self.depth_of_field,
            PassKind::ColorCorrection => &mut self.color_correction,
        }
    }

    pub fn is_enabled(&self, kind: PassKind) -> bool {
        self.pass(kind).enabled()
    }

    /// Enabled passes in execution order, after the base render.
    pub fn stages(&self) -> impl Iterator<Item = &EffectPass> {
        [
            &self.bloom,
            &self.vignette,
            &self.depth_of_field,
            &self.color_correction,
        ]
        .into_iter()
        .filter(|p| p.enabled())
    }

    /// Zero dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 || (width, height) == self.size {
            return false;
        }
        self.size = (width, height);
        true
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn dispose(&mut self) {
        self.select_look(Look::None);
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(chain: &EffectChain) -> Vec<PassKind> {
        chain.stages().map(|p| p.kind()).collect()
    }

    #[test]
    fn default_chain_runs_color_correction_only() {
        let chain = EffectChain::new(800, 600);
        assert_eq!(chain.look(), Look::None);
        assert_eq!(kinds(&chain), vec![PassKind::ColorCorrection]);
    }

    #[test]
    fn selecting_a_look_disables_the_previous_one() {
        let mut chain = EffectChain::new(800, 600);
        assert!(chain.select_look(Look::Bloom));
        assert!(chain.select_look(Look::Vignette));

        assert!(!chain.is_enabled(PassKind::Bloom));
        assert!(chain.is_enabled(PassKind::Vignette));
        assert!(chain.is_enabled(PassKind::ColorCorrection));
        assert_eq!(kinds(&chain), vec![PassKind::Vignette, PassKind::ColorCorrection]);
    }

    #[test]
    fn at_most_one_look_is_enabled() {
        let mut chain = EffectChain::new(800, 600);
        for look in [Look::DepthOfField, Look::Bloom, Look::None, Look::Vignette] {
            chain.select_look(look);
            let looks = chain
                .stages()
                .filter(|p| p.kind() != PassKind::ColorCorrection)
                .count();
            assert!(looks <= 1);
            assert_eq!(chain.look(), look);
        }
    }

    #[test]
    fn params_patch_without_changing_enable_flags() {
        let mut chain = EffectChain::new(800, 600);
        chain.select_look(Look::Bloom);
        assert!(chain.set_vignette(VignetteParams {
            darkness: 0.5,
            ..VignetteParams::default()
        }));
        assert_eq!(chain.look(), Look::Bloom);
        assert_eq!(chain.pass(PassKind::Vignette).revision(), 1);
    }

    #[test]
    fn look_accepts_bokeh_alias() {
        let look: Look = serde_json::from_str(r#""bokeh""#).unwrap();
        assert_eq!(look, Look::DepthOfField);
        let look: Look = serde_json::from_str(r#""depthOfField""#).unwrap();
        assert_eq!(look, Look::DepthOfField);
    }

    #[test]
    fn zero_resize_is_ignored() {
        let mut chain = EffectChain::new(800, 600);
        assert!(!chain.resize(0, 300));
        assert!(chain.resize(400, 300));
        assert_eq!(chain.size(), (400, 300));
    }
}
