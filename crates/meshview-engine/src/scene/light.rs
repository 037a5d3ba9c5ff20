use glam::Vec3;

use crate::paint::Rgb;

/// Tunable lighting parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightState {
    pub ambient_intensity: f32,
    pub point_intensity: f32,
    pub point_position: Vec3,
}

impl Default for LightState {
    fn default() -> Self {
        Self {
            ambient_intensity: 0.5,
            point_intensity: 1.0,
            point_position: Vec3::new(10.0, 10.0, 10.0),
        }
    }
}

impl LightState {
    /// Negative or non-finite intensities become 0; a non-finite position
    /// keeps `fallback`.
    pub fn sanitized(self, fallback: Vec3) -> Self {
        let intensity = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            ambient_intensity: intensity(self.ambient_intensity),
            point_intensity: intensity(self.point_intensity),
            point_position: if self.point_position.is_finite() {
                self.point_position
            } else {
                fallback
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
    /// Distance at which the light's contribution reaches zero.
    pub range: f32,
}

/// The scene's two lights. There is exactly one of each; updates mutate them
/// in place.
#[derive(Debug, Clone, PartialEq)]
pub struct LightingRig {
    ambient: AmbientLight,
    point: PointLight,
    revision: u64,
}

impl LightingRig {
    pub fn new(state: LightState) -> Self {
        let state = state.sanitized(LightState::default().point_position);
        Self {
            ambient: AmbientLight {
                color: Rgb::white(),
                intensity: state.ambient_intensity,
            },
            point: PointLight {
                color: Rgb::from_hex(0xffaa00),
                intensity: state.point_intensity,
                position: state.point_position,
                range: 100.0,
            },
            revision: 0,
        }
    }

    /// Returns true if anything changed.
    pub fn apply(&mut self, state: &LightState) -> bool {
        let state = state.sanitized(self.point.position);
        if state == self.state() {
            return false;
        }

        log::debug!("lighting updated: {state:?}");
        self.ambient.intensity = state.ambient_intensity;
        self.point.intensity = state.point_intensity;
        self.point.position = state.point_position;
        self.revision += 1;
        true
    }

    pub fn state(&self) -> LightState {
        LightState {
            ambient_intensity: self.ambient.intensity,
            point_intensity: self.point.intensity,
            point_position: self.point.position,
        }
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn point(&self) -> &PointLight {
        &self.point
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for LightingRig {
    fn default() -> Self {
        Self::new(LightState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_mutates_in_place() {
        let mut rig = LightingRig::default();
        let next = LightState {
            ambient_intensity: 0.1,
            point_intensity: 2.0,
            point_position: Vec3::new(0.0, 5.0, 0.0),
        };

        assert!(rig.apply(&next));
        assert_eq!(rig.state(), next);
        assert_eq!(rig.point().color, Rgb::from_hex(0xffaa00));
        assert!(!rig.apply(&next));
        assert_eq!(rig.revision(), 1);
    }

    #[test]
    fn negative_intensity_clamps_to_zero() {
        let mut rig = LightingRig::default();
        rig.apply(&LightState {
            ambient_intensity: -1.0,
            ..LightState::default()
        });
        assert_eq!(rig.ambient().intensity, 0.0);
    }
}
