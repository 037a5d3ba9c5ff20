//! Color model shared by the scene graph, the config contract and renderers.

mod color;

pub use color::Rgb;
