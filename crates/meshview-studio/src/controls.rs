use meshview_engine::config::ViewerConfig;
use meshview_engine::core::AppControl;
use meshview_engine::effects::Look;
use meshview_engine::input::{InputFrame, Key};
use meshview_engine::{Viewer, ViewerController};

const STEP: f32 = 0.1;

/// Keyboard stand-in for the settings form.
///
/// Every shortcut edits a [`ViewerConfig`] which is then handed to the
/// viewer whole; the viewer works out what changed.
///
/// | key        | effect                         |
/// |------------|--------------------------------|
/// | Space      | toggle auto-rotation           |
/// | W          | toggle wireframe               |
/// | 0..3       | no look, bloom, vignette, DoF  |
/// | E / D      | exposure up / down             |
/// | S / A      | saturation up / down           |
/// | Escape     | quit                           |
pub struct KeyboardControls {
    config: ViewerConfig,
}

impl KeyboardControls {
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Applies one shortcut to the config. Returns false for unbound keys.
    fn apply_key(&mut self, key: Key) -> bool {
        let cfg = &mut self.config;
        match key {
            Key::Space => cfg.rotating = !cfg.rotating,
            Key::W => cfg.wireframe = !cfg.wireframe,
            Key::Digit0 => cfg.effect = Look::None,
            Key::Digit1 => cfg.effect = Look::Bloom,
            Key::Digit2 => cfg.effect = Look::Vignette,
            Key::Digit3 => cfg.effect = Look::DepthOfField,
            Key::E => cfg.color_correction.exposure += STEP,
            Key::D => cfg.color_correction.exposure -= STEP,
            Key::S => cfg.color_correction.saturation += STEP,
            Key::A => cfg.color_correction.saturation -= STEP,
            _ => return false,
        }
        cfg.color_correction = cfg.color_correction.clamped();
        true
    }
}

impl ViewerController for KeyboardControls {
    fn update(&mut self, viewer: &mut Viewer, input: &InputFrame) -> AppControl {
        if input.key_pressed(Key::Escape) {
            return AppControl::Exit;
        }

        let mut dirty = false;
        for key in &input.keys_pressed {
            dirty |= self.apply_key(*key);
        }

        if dirty {
            let changes = viewer.apply_config(&self.config);
            log::info!(
                "effect {:?}, wireframe {}, rotating {}, exposure {:.1}, saturation {:.1}",
                self.config.effect,
                self.config.wireframe,
                self.config.rotating,
                self.config.color_correction.exposure,
                self.config.color_correction.saturation,
            );
            log::debug!("{changes:?}");
        }
        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_select_looks() {
        let mut controls = KeyboardControls::new(ViewerConfig::default());
        assert!(controls.apply_key(Key::Digit2));
        assert_eq!(controls.config.effect, Look::Vignette);
        assert!(controls.apply_key(Key::Digit0));
        assert_eq!(controls.config.effect, Look::None);
    }

    #[test]
    fn exposure_stays_in_range() {
        let mut controls = KeyboardControls::new(ViewerConfig::default());
        for _ in 0..50 {
            controls.apply_key(Key::E);
        }
        assert_eq!(controls.config.color_correction.exposure, 3.0);
        for _ in 0..50 {
            controls.apply_key(Key::D);
        }
        assert_eq!(controls.config.color_correction.exposure, 0.1);
    }

    #[test]
    fn shortcuts_reach_the_viewer() {
        let mut controls = KeyboardControls::new(ViewerConfig::default());
        let mut viewer = Viewer::new(800, 600);

        let mut input = InputFrame::default();
        input.keys_pressed.insert(Key::W);
        assert_eq!(controls.update(&mut viewer, &input), AppControl::Continue);
        assert!(viewer.scene().material().wireframe());

        input.keys_pressed.insert(Key::Escape);
        assert_eq!(controls.update(&mut viewer, &input), AppControl::Exit);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut controls = KeyboardControls::new(ViewerConfig::default());
        assert!(!controls.apply_key(Key::Q));
        assert_eq!(controls.config, ViewerConfig::default());
    }
}
