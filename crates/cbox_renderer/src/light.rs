//! Point lights for the Whitted tracer.

use cbox_math::Vec3;

use crate::Color;

/// Default quadratic attenuation coefficient.
pub const DEFAULT_ATTENUATION: f32 = 0.5;

/// An omnidirectional point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
    /// Radiance falls off as `1 / (1 + attenuation * distance²)`
    pub attenuation: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Color, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            attenuation: DEFAULT_ATTENUATION,
        }
    }

    pub fn with_attenuation(mut self, attenuation: f32) -> Self {
        self.attenuation = attenuation;
        self
    }

    /// Attenuation divisor for a point at squared distance `distance_sq`.
    #[inline]
    pub fn falloff(&self, distance_sq: f32) -> f32 {
        1.0 + self.attenuation * distance_sq
    }
}
