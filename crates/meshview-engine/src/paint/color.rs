use serde::{Deserialize, Serialize};

/// Linear RGB color, channels in `[0, 1]`.
///
/// Inbound values are user-facing slider positions, so out-of-range channels
/// are clamped rather than rejected (see [`Rgb::clamped`]).
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Creates a color from a `0xRRGGBB` literal.
    #[inline]
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }

    /// Clamps every channel to `[0, 1]`; non-finite channels become 0.
    #[inline]
    pub fn clamped(self) -> Self {
        let c = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self::new(c(self.r), c(self.g), c(self.b))
    }

    #[inline]
    pub fn scaled(self, k: f32) -> Self {
        Self::new(self.r * k, self.g * k, self.b * k)
    }

    /// `[r, g, b, a]` for uniform upload.
    #[inline]
    pub fn to_array4(self, a: f32) -> [f32; 4] {
        [self.r, self.g, self.b, a]
    }

    #[inline]
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_decodes_channels() {
        let c = Rgb::from_hex(0xffaa00);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 170.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
    }

    #[test]
    fn clamped_limits_and_sanitizes() {
        let c = Rgb::new(1.5, -0.2, f32::NAN).clamped();
        assert_eq!(c, Rgb::new(1.0, 0.0, 0.0));
    }
}
