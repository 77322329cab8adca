use std::f32::consts::{PI, TAU};

use glam::Vec2;

/// Directional cone: `angle` is clamped to `[-π, π]`, `openness` is the
/// unclamped half-width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamEmitter {
    angle: f32,
    openness: f32,
}

impl Default for BeamEmitter {
    fn default() -> Self {
        Self::new(PI, 0.0)
    }
}

impl BeamEmitter {
    pub fn new(angle: f32, openness: f32) -> Self {
        Self {
            angle: angle.clamp(-PI, PI),
            openness,
        }
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn openness(&self) -> f32 {
        self.openness
    }

    /// Saturates at the bounds instead of wrapping.
    pub fn rotate(&mut self, delta: f32) {
        self.angle = (self.angle + delta).clamp(-PI, PI);
    }

    pub fn widen(&mut self, delta: f32) {
        self.openness += delta;
    }

    pub fn narrow(&mut self, delta: f32) {
        self.openness -= delta;
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }

    /// Whether `bearing` lies within `angle ± openness`. A negative
    /// openness contains nothing.
    pub fn contains(&self, bearing: f32) -> bool {
        wrap_angle(bearing - self.angle).abs() <= self.openness
    }

    /// Heading for `u ∈ [-1, 1]` across the cone.
    pub fn emission_heading(&self, u: f32) -> f32 {
        self.angle + self.openness * u
    }
}

/// Wraps an angle difference into `[-π, π)`.
pub fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}
