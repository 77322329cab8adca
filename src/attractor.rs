//! User-placed point masses.
//!
//! Attractors are appended in placement order up to a fixed capacity and
//! never removed individually; a full set stays full until it is reset.

use std::{f32::consts::PI, fmt};

use glam::Vec2;

/// Default cap on placed attractors.
pub const DEFAULT_CAPACITY: usize = 10;

/// Average density (kg/m³) used to turn a radius into a mass.
pub const AVG_DENSITY: f32 = 5510.0;

/// Metres per unit of normalized device space.
pub const DIST_SCALE: f32 = 6_371_000.0;

/// A committed point mass. Matches the WGSL `Attractor` struct (16 bytes).
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Attractor {
    pub position: Vec2,
    pub mass: f32,
    pub radius: f32,
}

/// `4/3 · π · r³ · density`
pub fn mass_from_radius(radius: f32, density: f32) -> f32 {
    4.0 / 3.0 * PI * radius.powi(3) * density
}

/// Returned by [`AttractorSet::add`] once the set is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub capacity: usize,
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attractor capacity of {} reached; reset to place more",
            self.capacity
        )
    }
}

impl std::error::Error for CapacityExceeded {}

#[derive(Clone, Debug)]
pub struct AttractorSet {
    attractors: Vec<Attractor>,
    capacity: usize,
    density: f32,
}

impl Default for AttractorSet {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, AVG_DENSITY)
    }
}

impl AttractorSet {
    pub fn new(capacity: usize, density: f32) -> Self {
        Self {
            attractors: Vec::with_capacity(capacity),
            capacity,
            density,
        }
    }

    /// Commits an attractor of the given radius at `position` and returns its
    /// index.
    pub fn add(&mut self, position: Vec2, radius: f32) -> Result<usize, CapacityExceeded> {
        if self.is_full() {
            return Err(CapacityExceeded {
                capacity: self.capacity,
            });
        }

        self.attractors.push(Attractor {
            position,
            mass: mass_from_radius(radius, self.density),
            radius,
        });
        Ok(self.attractors.len() - 1)
    }

    pub fn count(&self) -> usize {
        self.attractors.len()
    }

    pub fn get(&self, index: usize) -> Option<Attractor> {
        self.attractors.get(index).copied()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn density(&self) -> f32 {
        self.density
    }

    pub fn is_full(&self) -> bool {
        self.attractors.len() >= self.capacity
    }

    /// The live attractors, exactly `count()` long.
    pub fn as_slice(&self) -> &[Attractor] {
        &self.attractors
    }

    /// Discards the set and starts over with the same capacity and density.
    pub fn reset(&mut self) {
        *self = Self::new(self.capacity, self.density);
    }
}
