use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::input::{
    InputEvent,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
};

use super::perspective::PerspectiveCamera;

/// Keeps the camera off the poles, where `look_at` degenerates.
const POLAR_EPSILON: f32 = 1e-4;

/// Wheel pixels that count as one scroll line.
const PIXELS_PER_LINE: f32 = 50.0;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DragMode {
    Rotate,
    Pan,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum OrbitState {
    Idle,
    /// `button` started the drag; only its release ends it.
    Dragging {
        mode: DragMode,
        button: MouseButton,
        last: Vec2,
    },
}

/// Turns pointer and wheel input into damped orbit motion of a
/// [`PerspectiveCamera`] around its target.
///
/// Input handlers only accumulate pending deltas; [`update`](Self::update)
/// applies them once per frame.
#[derive(Debug, Clone)]
pub struct OrbitCameraController {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,

    state: OrbitState,
    viewport: Vec2,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec2,
    pending_zoom: f32,
    disposed: bool,
}

impl Default for OrbitCameraController {
    fn default() -> Self {
        Self {
            damping_factor: 0.25,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 100.0,
            state: OrbitState::Idle,
            viewport: Vec2::ONE,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec2::ZERO,
            pending_zoom: 1.0,
            disposed: false,
        }
    }
}

impl OrbitCameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OrbitState {
        self.state
    }

    /// Sets the interactive area in logical pixels.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
        }
    }

    /// Returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        if self.disposed {
            return false;
        }

        match event {
            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state: MouseButtonState::Pressed,
                x,
                y,
                ..
            }) => {
                let mode = match button {
                    MouseButton::Left => DragMode::Rotate,
                    MouseButton::Right | MouseButton::Middle => DragMode::Pan,
                    _ => return false,
                };
                if self.is_dragging() || !self.contains(*x, *y) {
                    return false;
                }
                self.state = OrbitState::Dragging {
                    mode,
                    button: *button,
                    last: Vec2::new(*x, *y),
                };
                true
            }

            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state: MouseButtonState::Released,
                ..
            }) => match self.state {
                OrbitState::Dragging { button: held, .. } if held == *button => {
                    self.state = OrbitState::Idle;
                    true
                }
                _ => false,
            },

            InputEvent::PointerLeft => {
                let was_dragging = self.is_dragging();
                self.state = OrbitState::Idle;
                was_dragging
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => {
                let OrbitState::Dragging { mode, button, last } = self.state else {
                    return false;
                };
                let pos = Vec2::new(*x, *y);
                self.drag(mode, pos - last);
                self.state = OrbitState::Dragging {
                    mode,
                    button,
                    last: pos,
                };
                true
            }

            InputEvent::MouseWheel { delta, .. } => {
                let lines = match *delta {
                    MouseWheelDelta::Line { y, .. } => y,
                    MouseWheelDelta::Pixel { y, .. } => y / PIXELS_PER_LINE,
                };
                self.zoom(lines);
                true
            }

            _ => false,
        }
    }

    /// Accumulates a drag of `delta` logical pixels.
    pub fn drag(&mut self, mode: DragMode, delta: Vec2) {
        match mode {
            DragMode::Rotate => {
                let h = self.viewport.y;
                self.pending_theta -= TAU * delta.x / h * self.rotate_speed;
                self.pending_phi -= TAU * delta.y / h * self.rotate_speed;
            }
            DragMode::Pan => self.pending_pan += delta,
        }
    }

    /// Positive `lines` zoom in.
    pub fn zoom(&mut self, lines: f32) {
        if lines.is_finite() {
            self.pending_zoom *= 0.95f32.powf(lines * self.zoom_speed);
        }
    }

    /// Applies one damping step to `camera`. Returns true if the camera moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        if self.disposed {
            return false;
        }

        let damping = self.damping_factor.clamp(0.0, 1.0);
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius <= f32::EPSILON || !radius.is_finite() {
            return false;
        }

        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.pending_theta * damping;
        phi = (phi + self.pending_phi * damping).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        let radius = (radius * self.pending_zoom).clamp(self.min_distance, self.max_distance);
        self.pending_zoom = 1.0;

        let pan = self.pending_pan * damping;
        if pan != Vec2::ZERO {
            let forward = (camera.target - camera.position).normalize_or_zero();
            let right = forward.cross(camera.up).normalize_or_zero();
            let up = right.cross(forward);
            let half_height = radius * (camera.fov_y.to_radians() / 2.0).tan();
            let scale = 2.0 * half_height / self.viewport.y;
            camera.target += (right * -pan.x + up * pan.y) * scale;
        }

        let keep = 1.0 - damping;
        self.pending_theta *= keep;
        self.pending_phi *= keep;
        self.pending_pan *= keep;

        let next = camera.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
        let moved = next.distance_squared(camera.position) > f32::EPSILON * f32::EPSILON;
        camera.position = next;
        moved || pan != Vec2::ZERO
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, OrbitState::Dragging { .. })
    }

    /// True while a drag is in progress or motion has not settled.
    pub fn is_moving(&self) -> bool {
        self.is_dragging()
            || self.pending_theta.abs() > 1e-6
            || self.pending_phi.abs() > 1e-6
            || self.pending_pan.length_squared() > 1e-6
    }

    /// Drops drag state and pending motion; later input is ignored.
    pub fn dispose(&mut self) {
        self.state = OrbitState::Idle;
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_pan = Vec2::ZERO;
        self.pending_zoom = 1.0;
        self.disposed = true;
    }

    fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x <= self.viewport.x && y <= self.viewport.y
    }
}
