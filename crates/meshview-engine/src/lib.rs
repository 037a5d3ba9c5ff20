//! meshview engine crate.
//!
//! Interactive viewer for procedurally generated meshes: validated mesh
//! buffers, a fixed-shape scene graph, a damped orbit camera and a
//! post-processing chain, rendered with wgpu inside a winit window.
//!
//! CPU state (`mesh`, `scene`, `camera`, `effects`, `viewer`) never touches
//! the GPU; `render` mirrors it onto wgpu objects each frame.

pub mod device;
pub mod window;
pub mod input;
pub mod core;

pub mod logging;
pub mod error;
pub mod config;
pub mod paint;

pub mod mesh;
pub mod scene;
pub mod camera;
pub mod effects;
pub mod render;
pub mod viewer;

pub use config::ViewerConfig;
pub use error::ViewerError;
pub use viewer::{Viewer, ViewerApp, ViewerController};
