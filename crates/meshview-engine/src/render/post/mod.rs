//! Offscreen targets and the fullscreen passes that turn the scene render
//! into the presented image.

mod composer;
mod fullscreen;
mod targets;

pub use composer::Composer;
pub(crate) use targets::{DEPTH_FORMAT, HDR_FORMAT};
