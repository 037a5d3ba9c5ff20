use crate::camera::{OrbitCameraController, PerspectiveCamera};
use crate::config::{ConfigChanges, ViewerConfig};
use crate::core::{FrameFault, FrameOutcome};
use crate::effects::EffectChain;
use crate::error::ViewerError;
use crate::input::InputEvent;
use crate::mesh::{GeometryBuilder, MeshBuffer, MeshResponse};
use crate::scene::{Material, SceneGraph, TextureImage};

use super::render_loop::RenderLoop;
use super::viewport::{ResizeOutcome, ViewportState};

/// CPU-side state of one viewer instance.
///
/// Owns the scene, camera, orbit controller, effect chain and render loop.
/// The surrounding UI talks to it through [`apply_config`](Self::apply_config)
/// and [`set_mesh`](Self::set_mesh); the window layer feeds it input, resizes
/// and frame results. GPU objects live in [`FrameRenderer`](crate::render::FrameRenderer).
#[derive(Debug)]
pub struct Viewer {
    builder: GeometryBuilder,
    scene: SceneGraph,
    viewport: ViewportState,
    orbit: OrbitCameraController,
    effects: EffectChain,
    render_loop: RenderLoop,
    config: Option<ViewerConfig>,
    disposed: bool,
}

impl Viewer {
    /// Creates a viewer for a surface of `width` x `height` physical pixels
    /// and applies the default config.
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, &ViewerConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: &ViewerConfig) -> Self {
        let viewport = ViewportState::new(width, height, 1.0);
        let (w, h) = viewport.size();
        let mut viewer = Self {
            builder: GeometryBuilder::new(),
            scene: SceneGraph::new(config.light_state()),
            orbit: OrbitCameraController::new(),
            effects: EffectChain::new(w, h),
            render_loop: RenderLoop::new(),
            viewport,
            config: None,
            disposed: false,
        };
        let (lw, lh) = viewer.viewport.logical_size();
        viewer.orbit.set_viewport(lw, lh);
        viewer.apply_config(config);
        viewer
    }

    // ── inbound UI contract ────────────────────────────────────────────────

    /// Applies a whole config, patching only subsystems whose inputs changed
    /// since the previous call. The first call patches everything.
    pub fn apply_config(&mut self, config: &ViewerConfig) -> ConfigChanges {
        if self.disposed {
            return ConfigChanges::default();
        }

        let changes = match &self.config {
            Some(previous) => config.diff(previous),
            None => ConfigChanges::all(),
        };
        if changes.is_empty() {
            return changes;
        }

        if changes.look {
            self.effects.select_look(config.effect);
        }
        if changes.material {
            let mut material = self.scene.material_mut();
            material.set_color(config.color.r, config.color.g, config.color.b);
            material.set_wireframe(config.wireframe);
        }
        if changes.texture {
            let image = config.texture.as_deref().and_then(|encoded| {
                TextureImage::from_png_base64(encoded)
                    .inspect_err(|e| log::warn!("{e}; falling back to solid color"))
                    .ok()
            });
            self.scene.material_mut().set_texture(image);
        }
        if changes.lighting {
            self.scene.set_lighting(&config.light_state());
        }
        if changes.bloom {
            self.effects.set_bloom(config.bloom);
        }
        if changes.vignette {
            self.effects.set_vignette(config.vignette);
        }
        if changes.depth_of_field {
            self.effects.set_depth_of_field(config.depth_of_field);
        }
        if changes.color_correction {
            self.effects.set_color_correction(config.color_correction);
        }
        if changes.rotation {
            self.render_loop.set_rotating(config.rotating);
        }

        log::debug!("config applied: {changes:?}");
        self.config = Some(config.clone());
        changes
    }

    /// The last applied config.
    pub fn config(&self) -> Option<&ViewerConfig> {
        self.config.as_ref()
    }

    /// Replaces the displayed mesh with `positions`/`indices`.
    ///
    /// On invalid input the empty mesh is shown and the error returned; the
    /// material and camera are untouched either way.
    pub fn set_mesh(&mut self, positions: &[f32], indices: &[u32]) -> Result<(), ViewerError> {
        let built = self.builder.build(positions, indices).map_err(ViewerError::from);
        self.attach_or_clear(built)
    }

    /// Same as [`set_mesh`](Self::set_mesh) for a backend response.
    pub fn load_response(&mut self, response: &MeshResponse) -> Result<(), ViewerError> {
        let built = response.to_mesh(&self.builder);
        self.attach_or_clear(built)
    }

    fn attach_or_clear(&mut self, built: Result<MeshBuffer, ViewerError>) -> Result<(), ViewerError> {
        if self.disposed {
            return Ok(());
        }
        match built {
            Ok(buffer) => {
                self.scene.replace_geometry(buffer);
                Ok(())
            }
            Err(e) => {
                log::warn!("{e}; showing an empty mesh");
                self.scene.clear_geometry();
                Err(e)
            }
        }
    }

    /// Replaces geometry and material together, e.g. when switching models.
    pub fn attach(&mut self, buffer: MeshBuffer, material: Material) {
        if !self.disposed {
            self.scene.attach_mesh(buffer, material);
        }
    }

    // ── window layer ───────────────────────────────────────────────────────

    /// Feeds pointer/wheel input to the orbit controller. Returns true if
    /// consumed.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.orbit.handle_event(event)
    }

    /// Resizes camera aspect and effect targets together.
    ///
    /// The surface itself is resized by the window layer before this is
    /// called, so all three agree before the next frame.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64) -> ResizeOutcome {
        let outcome = self.viewport.resize(width, height, scale_factor);
        match outcome {
            ResizeOutcome::Resized => {
                let (w, h) = self.viewport.size();
                self.effects.resize(w, h);
                let (lw, lh) = self.viewport.logical_size();
                self.orbit.set_viewport(lw, lh);
                log::info!("viewport resized to {w}x{h}");
            }
            ResizeOutcome::Minimized => log::debug!("viewport minimised; keeping last size"),
            ResizeOutcome::Unchanged => {}
        }
        outcome
    }

    /// Advances rotation and camera for the next frame. Returns false when
    /// nothing should be drawn.
    pub fn tick(&mut self) -> bool {
        if self.viewport.is_minimized() {
            return false;
        }
        self.render_loop.tick(
            self.scene.mesh_transform_mut(),
            &mut self.orbit,
            self.viewport.camera_mut(),
        )
    }

    /// False once the loop has stopped or while minimised. The window layer
    /// stops scheduling redraws until a resize arrives.
    pub fn wants_redraw(&self) -> bool {
        self.render_loop.is_running() && !self.viewport.is_minimized()
    }

    pub fn report_frame(&mut self, result: Result<FrameOutcome, FrameFault>) {
        self.render_loop.report(result);
    }

    /// Split borrow for the renderer.
    pub fn frame_parts(&mut self) -> (&mut SceneGraph, &PerspectiveCamera, &EffectChain) {
        (&mut self.scene, self.viewport.camera(), &self.effects)
    }

    // ── teardown ───────────────────────────────────────────────────────────

    /// First half of teardown: stops the loop, then drops the orbit
    /// controller's drag state and the effect chain.
    ///
    /// GPU objects are released after this and before [`dispose`](Self::dispose).
    pub fn stop(&mut self) {
        self.render_loop.cancel();
        self.orbit.dispose();
        self.effects.dispose();
    }

    /// Stops (if not already stopped) and releases geometry and material.
    /// Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop();
        self.scene.dispose();
        self.disposed = true;
        log::info!("viewer disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── accessors ──────────────────────────────────────────────────────────

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        self.viewport.camera()
    }

    pub fn orbit(&self) -> &OrbitCameraController {
        &self.orbit
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCameraController {
        &mut self.orbit
    }

    pub fn effects(&self) -> &EffectChain {
        &self.effects
    }

    pub fn render_loop(&self) -> &RenderLoop {
        &self.render_loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Look, PassKind};
    use crate::mesh::GeometryError;
    use crate::paint::Rgb;
    use crate::scene::ResourceKind;
    use crate::viewer::LoopState;

    const TRIANGLE: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

    #[test]
    fn single_triangle_and_wireframe_toggle() {
        let mut viewer = Viewer::new(800, 600);
        viewer.set_mesh(&TRIANGLE, &[0, 1, 2]).unwrap();

        let buffer = viewer.scene().mesh().geometry().buffer();
        assert_eq!(buffer.vertex_count(), 3);
        assert_eq!(buffer.face_count(), 1);

        let color = viewer.scene().material().color();
        let mut config = ViewerConfig {
            wireframe: true,
            ..ViewerConfig::default()
        };
        viewer.apply_config(&config);
        assert!(viewer.scene().material().wireframe());
        config.wireframe = false;
        viewer.apply_config(&config);
        assert!(!viewer.scene().material().wireframe());
        assert_eq!(viewer.scene().material().color(), color);
    }

    #[test]
    fn malformed_indices_show_empty_mesh() {
        let mut viewer = Viewer::new(800, 600);
        viewer.set_mesh(&TRIANGLE, &[0, 1, 2]).unwrap();

        let err = viewer.set_mesh(&TRIANGLE, &[0, 1, 5]).unwrap_err();
        assert!(matches!(
            err,
            ViewerError::Geometry(GeometryError::IndexOutOfBounds { value: 5, .. })
        ));
        assert!(viewer.scene().mesh().geometry().buffer().is_empty());
        assert_eq!(viewer.scene().resources().live_count(ResourceKind::Geometry), 1);

        // The loop keeps going.
        assert!(viewer.tick());
    }

    #[test]
    fn backend_error_response_shows_empty_mesh() {
        let mut viewer = Viewer::new(800, 600);
        let response = MeshResponse::from_json(r#"{"error": "out of memory"}"#).unwrap();
        assert!(matches!(
            viewer.load_response(&response),
            Err(ViewerError::Backend(_))
        ));
        assert!(viewer.scene().mesh().geometry().buffer().is_empty());
    }

    #[test]
    fn resize_moves_camera_and_effects_together() {
        let mut viewer = Viewer::new(800, 600);
        assert_eq!(viewer.resize(400, 300, 1.0), ResizeOutcome::Resized);

        assert_eq!(viewer.camera().aspect, 400.0 / 300.0);
        assert_eq!(viewer.effects().size(), (400, 300));
        assert_eq!(viewer.viewport().size(), (400, 300));
    }

    #[test]
    fn zero_size_keeps_last_valid_state_and_skips_frames() {
        let mut viewer = Viewer::new(800, 600);
        assert_eq!(viewer.resize(0, 0, 1.0), ResizeOutcome::Minimized);
        assert_eq!(viewer.effects().size(), (800, 600));
        assert_eq!(viewer.camera().aspect, 800.0 / 600.0);
        assert!(!viewer.tick());
    }

    #[test]
    fn redraws_stop_after_a_fault_and_while_minimised() {
        let mut viewer = Viewer::new(800, 600);
        assert!(viewer.wants_redraw());

        viewer.resize(0, 0, 1.0);
        assert!(!viewer.wants_redraw());
        viewer.resize(800, 600, 1.0);
        assert!(viewer.wants_redraw());

        viewer.report_frame(Err(FrameFault::SurfaceOutOfMemory));
        assert!(!viewer.wants_redraw());
        assert!(!viewer.tick());
    }

    #[test]
    fn config_patches_only_changed_subsystems() {
        let mut viewer = Viewer::new(800, 600);
        let revision = viewer.scene().material().revision();

        let mut config = ViewerConfig::default();
        config.effect = Look::Bloom;
        let changes = viewer.apply_config(&config);
        assert!(changes.look);
        assert!(!changes.material);
        assert_eq!(viewer.scene().material().revision(), revision);
        assert!(viewer.effects().is_enabled(PassKind::Bloom));

        config.effect = Look::Vignette;
        viewer.apply_config(&config);
        assert!(!viewer.effects().is_enabled(PassKind::Bloom));
        assert!(viewer.effects().is_enabled(PassKind::Vignette));
        assert!(viewer.effects().is_enabled(PassKind::ColorCorrection));

        assert!(viewer.apply_config(&config).is_empty());
    }

    #[test]
    fn config_color_and_rotation_reach_scene_and_loop() {
        let mut viewer = Viewer::new(800, 600);
        let config = ViewerConfig {
            color: Rgb::new(0.2, 0.4, 0.6),
            rotating: false,
            ..ViewerConfig::default()
        };
        viewer.apply_config(&config);

        assert_eq!(viewer.scene().material().color(), Rgb::new(0.2, 0.4, 0.6));
        let before = viewer.scene().mesh().transform().rotation;
        viewer.tick();
        assert_eq!(viewer.scene().mesh().transform().rotation, before);
    }

    #[test]
    fn undecodable_texture_degrades_to_solid() {
        let mut viewer = Viewer::new(800, 600);
        let config = ViewerConfig {
            texture: Some("not base64!".into()),
            ..ViewerConfig::default()
        };
        viewer.apply_config(&config);
        assert!(viewer.scene().material().texture().is_none());
    }

    #[test]
    fn dispose_cancels_loop_and_releases_scene() {
        let mut viewer = Viewer::new(800, 600);
        viewer.set_mesh(&TRIANGLE, &[0, 1, 2]).unwrap();
        viewer.dispose();
        viewer.dispose();

        assert!(viewer.is_disposed());
        assert_eq!(viewer.render_loop().state(), &LoopState::Cancelled);
        assert!(viewer.effects().is_disposed());
        assert_eq!(viewer.scene().resources().live_count(ResourceKind::Geometry), 0);
        assert!(!viewer.tick());
    }
}
