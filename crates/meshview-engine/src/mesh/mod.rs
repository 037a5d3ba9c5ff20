//! Mesh data: validation of externally supplied vertex/index arrays and the
//! immutable buffers the scene graph and renderer consume.
//!
//! Nothing here touches the GPU; uploads happen in `render::mesh`.

mod buffer;
mod builder;
mod response;

pub use buffer::{Bounds, IndexData, MeshBuffer, MeshVertex};
pub use builder::{GeometryBuilder, GeometryError, GeometryFault};
pub use response::MeshResponse;
