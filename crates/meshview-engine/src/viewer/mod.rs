//! The viewer: CPU state for one viewport, the per-frame loop, and the
//! runtime app that puts them on screen.
//!
//! Teardown order is fixed: stop the loop, drop controller and effect
//! state, release GPU objects, release scene resources, then the runtime
//! drops the surface.

mod app;
mod render_loop;
mod state;
mod viewport;

pub use app::{ViewerApp, ViewerController};
pub use render_loop::{LoopState, RenderLoop, RotationState, ROTATION_STEP_X, ROTATION_STEP_Y};
pub use state::Viewer;
pub use viewport::{ResizeOutcome, ViewportState};
