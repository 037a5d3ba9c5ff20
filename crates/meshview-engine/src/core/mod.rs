//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! the layers above it: the app callbacks and the per-frame context.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, FrameFault, FrameOutcome, WindowCtx};
