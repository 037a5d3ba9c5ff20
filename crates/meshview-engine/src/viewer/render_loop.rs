use crate::camera::{OrbitCameraController, PerspectiveCamera};
use crate::core::{FrameFault, FrameOutcome};
use crate::scene::Transform;

/// Per-frame rotation increment around X, in radians.
pub const ROTATION_STEP_X: f32 = 0.005;
/// Per-frame rotation increment around Y, in radians.
pub const ROTATION_STEP_Y: f32 = 0.01;

/// Auto-rotation toggle.
///
/// The increment is applied once per frame, not per unit of time, so the
/// spin speed follows the display refresh rate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RotationState {
    pub active: bool,
}

impl Default for RotationState {
    fn default() -> Self {
        Self { active: true }
    }
}

impl RotationState {
    /// Returns true if `transform` was rotated.
    pub fn advance(&self, transform: &mut Transform) -> bool {
        if !self.active {
            return false;
        }
        transform.rotation.x += ROTATION_STEP_X;
        transform.rotation.y += ROTATION_STEP_Y;
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    Running,
    /// Stopped by teardown; no further ticks.
    Cancelled,
    /// Stopped by a frame fault; no further ticks.
    Faulted(FrameFault),
}

/// Per-frame driver: rotation, camera damping, then the draw.
///
/// The loop never panics. A fault moves it to [`LoopState::Faulted`] and
/// every later tick is a no-op.
#[derive(Debug, Clone)]
pub struct RenderLoop {
    state: LoopState,
    rotation: RotationState,
    frames: u64,
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self {
            state: LoopState::Running,
            rotation: RotationState::default(),
            frames: 0,
        }
    }
}

impl RenderLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    /// Takes effect on the next tick.
    pub fn set_rotating(&mut self, active: bool) -> bool {
        if self.rotation.active == active {
            return false;
        }
        self.rotation.active = active;
        true
    }

    /// Frames drawn since start.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Advances per-frame state ahead of the draw.
    ///
    /// Returns false when the frame must not be drawn: the loop is stopped,
    /// or the camera ended up in a state that cannot be rendered (which
    /// faults the loop).
    pub fn tick(
        &mut self,
        transform: &mut Transform,
        orbit: &mut OrbitCameraController,
        camera: &mut PerspectiveCamera,
    ) -> bool {
        if !self.is_running() {
            return false;
        }

        self.rotation.advance(transform);
        orbit.update(camera);

        if !camera.is_valid() {
            self.fault(FrameFault::NonFiniteCamera);
            return false;
        }
        true
    }

    /// Records how the draw went.
    pub fn report(&mut self, result: Result<FrameOutcome, FrameFault>) {
        match result {
            Ok(FrameOutcome::Presented) => self.frames += 1,
            Ok(FrameOutcome::Skipped) => {}
            Err(fault) => self.fault(fault),
        }
    }

    /// Stops the loop ahead of teardown.
    pub fn cancel(&mut self) {
        if self.is_running() {
            log::debug!("render loop cancelled after {} frames", self.frames);
            self.state = LoopState::Cancelled;
        }
    }

    fn fault(&mut self, fault: FrameFault) {
        if !self.is_running() {
            return;
        }
        log::error!("render loop halted: {fault}");
        self.state = LoopState::Faulted(fault);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn parts() -> (Transform, OrbitCameraController, PerspectiveCamera) {
        (
            Transform::default(),
            OrbitCameraController::new(),
            PerspectiveCamera::with_aspect(800, 600),
        )
    }

    #[test]
    fn tick_rotates_by_fixed_step() {
        let (mut transform, mut orbit, mut camera) = parts();
        let mut render_loop = RenderLoop::new();

        assert!(render_loop.tick(&mut transform, &mut orbit, &mut camera));
        assert!(render_loop.tick(&mut transform, &mut orbit, &mut camera));

        assert!((transform.rotation.x - 2.0 * ROTATION_STEP_X).abs() < 1e-6);
        assert!((transform.rotation.y - 2.0 * ROTATION_STEP_Y).abs() < 1e-6);
    }

    #[test]
    fn stopping_rotation_halts_on_next_tick() {
        let (mut transform, mut orbit, mut camera) = parts();
        let mut render_loop = RenderLoop::new();
        render_loop.tick(&mut transform, &mut orbit, &mut camera);

        assert!(render_loop.set_rotating(false));
        let before = transform.rotation;
        render_loop.tick(&mut transform, &mut orbit, &mut camera);
        assert_eq!(transform.rotation, before);
        render_loop.tick(&mut transform, &mut orbit, &mut camera);
        assert_eq!(transform.rotation, before);
    }

    #[test]
    fn cancelled_loop_does_nothing() {
        let (mut transform, mut orbit, mut camera) = parts();
        let mut render_loop = RenderLoop::new();
        render_loop.cancel();

        assert!(!render_loop.tick(&mut transform, &mut orbit, &mut camera));
        assert_eq!(transform.rotation, Vec3::ZERO);
        assert_eq!(render_loop.state(), &LoopState::Cancelled);
    }

    #[test]
    fn invalid_camera_faults_the_loop() {
        let (mut transform, mut orbit, mut camera) = parts();
        camera.position = Vec3::new(f32::NAN, 0.0, 5.0);
        let mut render_loop = RenderLoop::new();

        assert!(!render_loop.tick(&mut transform, &mut orbit, &mut camera));
        assert_eq!(
            render_loop.state(),
            &LoopState::Faulted(FrameFault::NonFiniteCamera)
        );

        // Later ticks are no-ops.
        let rotation = transform.rotation;
        camera = PerspectiveCamera::default();
        assert!(!render_loop.tick(&mut transform, &mut orbit, &mut camera));
        assert_eq!(transform.rotation, rotation);
    }

    #[test]
    fn surface_fault_halts_and_presented_frames_count() {
        let mut render_loop = RenderLoop::new();
        render_loop.report(Ok(FrameOutcome::Presented));
        render_loop.report(Ok(FrameOutcome::Skipped));
        assert_eq!(render_loop.frames(), 1);

        render_loop.report(Err(FrameFault::SurfaceOutOfMemory));
        assert!(!render_loop.is_running());

        // The first fault wins.
        render_loop.cancel();
        assert_eq!(
            render_loop.state(),
            &LoopState::Faulted(FrameFault::SurfaceOutOfMemory)
        );
    }
}
