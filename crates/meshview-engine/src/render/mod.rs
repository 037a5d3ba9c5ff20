//! GPU rendering subsystem.
//!
//! Renderers mirror CPU-side scene and effect state onto wgpu objects. They
//! own their GPU resources and create them lazily on first use, so none of
//! the CPU state needs a device to exist.

mod ctx;
mod frame;
mod mesh;
mod post;
mod uniforms;

pub use ctx::{RenderCtx, RenderTarget};
pub use frame::FrameRenderer;
pub use mesh::MeshRenderer;
pub use post::Composer;
