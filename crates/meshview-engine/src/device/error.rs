/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error or minimised window; skip the current frame.
    SkipFrame,
    /// Out of memory. The render loop halts.
    Fatal,
}
