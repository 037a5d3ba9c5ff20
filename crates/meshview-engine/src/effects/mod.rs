//! Post-processing configuration: which passes run, in what order, with what
//! parameters. The GPU side lives in `render::post`.

mod chain;
mod pass;

pub use chain::{EffectChain, Look};
pub use pass::{
    BloomParams,
    ColorCorrectionParams,
    DepthOfFieldParams,
    EffectPass,
    PassKind,
    PassParams,
    VignetteParams,
};
