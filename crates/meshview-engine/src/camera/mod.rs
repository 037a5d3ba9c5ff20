//! Perspective camera and the orbit controller that drives it.

mod orbit;
mod perspective;

pub use orbit::{DragMode, OrbitCameraController, OrbitState};
pub use perspective::PerspectiveCamera;
