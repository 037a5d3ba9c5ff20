//! Scene graph: the mesh node, its material, the lighting rig, and the ledger
//! of GPU-backed handles they own.
//!
//! Everything in this module is CPU state. The renderer reads it each frame
//! and mirrors it onto the GPU.

mod graph;
mod light;
mod material;
mod resources;

pub use graph::{Geometry, MeshNode, SceneGraph, SceneNode, Transform};
pub use light::{AmbientLight, LightState, LightingRig, PointLight};
pub use material::{Material, MaterialController, MaterialMode, TextureImage};
pub use resources::{
    GeometryHandle, LedgerStats, ResourceId, ResourceKind, ResourceLedger, TextureHandle,
};
