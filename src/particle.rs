use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;

use crate::beam::BeamEmitter;

/// One slot of the particle population, laid out exactly as the WGSL
/// `Particle` struct (24 bytes).
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub age: f32,
    pub life: f32,
    pub velocity: Vec2,
}

impl Particle {
    pub fn is_dead(&self) -> bool {
        self.age >= self.life
    }
}

/// Distributions a particle is drawn from at seeding and on recycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPolicy {
    pub domain_min: Vec2,
    pub domain_max: Vec2,
    pub life_min: f32,
    pub life_max: f32,
    pub speed_min: f32,
    pub speed_max: f32,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            domain_min: Vec2::splat(-1.0),
            domain_max: Vec2::splat(1.0),
            life_min: 2.0,
            life_max: 4.0,
            speed_min: 0.1,
            speed_max: 0.5,
        }
    }
}

impl SpawnPolicy {
    /// Uniform position in the domain, uniform heading.
    pub fn spawn<R: Rng + ?Sized>(&self, rng: &mut R) -> Particle {
        let position = Vec2::new(
            lerp(self.domain_min.x, self.domain_max.x, rng.gen()),
            lerp(self.domain_min.y, self.domain_max.y, rng.gen()),
        );
        let heading = lerp(-PI, PI, rng.gen());

        Particle {
            position,
            age: 0.0,
            life: self.sample_life(rng),
            velocity: Vec2::from_angle(heading) * self.sample_speed(rng),
        }
    }

    /// Emits from `origin` along the beam, heading within
    /// `angle ± openness`.
    pub fn emit<R: Rng + ?Sized>(&self, rng: &mut R, origin: Vec2, beam: &BeamEmitter) -> Particle {
        let heading = beam.emission_heading(lerp(-1.0, 1.0, rng.gen()));

        Particle {
            position: origin,
            age: 0.0,
            life: self.sample_life(rng),
            velocity: Vec2::from_angle(heading) * self.sample_speed(rng),
        }
    }

    fn sample_life<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        lerp(self.life_min, self.life_max, rng.gen())
    }

    fn sample_speed<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        lerp(self.speed_min, self.speed_max, rng.gen())
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    #[test]
    fn particle_matches_gpu_layout() {
        assert_eq!(std::mem::size_of::<Particle>(), 24);
        assert_eq!(std::mem::align_of::<Particle>(), 4);
    }

    #[test]
    fn spawn_stays_inside_policy() {
        let policy = SpawnPolicy::default();
        let mut rng = SmallRng::seed_from_u64(7);

        for _ in 0..1000 {
            let p = policy.spawn(&mut rng);
            assert!(p.position.cmpge(policy.domain_min).all());
            assert!(p.position.cmple(policy.domain_max).all());
            assert!(p.life >= policy.life_min && p.life <= policy.life_max);
            assert_eq!(p.age, 0.0);

            let speed = p.velocity.length();
            assert!(speed >= policy.speed_min - 1e-5 && speed <= policy.speed_max + 1e-5);
        }
    }

    #[test]
    fn emit_starts_at_origin_inside_cone() {
        let policy = SpawnPolicy::default();
        let mut beam = BeamEmitter::new(0.0, 0.0);
        beam.widen(0.3);
        let origin = Vec2::new(0.25, -0.5);
        let mut rng = SmallRng::seed_from_u64(11);

        for _ in 0..500 {
            let p = policy.emit(&mut rng, origin, &beam);
            assert_eq!(p.position, origin);
            let heading = p.velocity.y.atan2(p.velocity.x);
            assert!(heading.abs() <= 0.3 + 1e-5, "heading {heading} outside cone");
        }
    }

    #[test]
    fn degenerate_ranges_collapse_to_a_point() {
        let policy = SpawnPolicy {
            life_min: 3.0,
            life_max: 3.0,
            speed_min: 0.0,
            speed_max: 0.0,
            ..Default::default()
        };
        let p = policy.spawn(&mut SmallRng::seed_from_u64(1));
        assert_eq!(p.life, 3.0);
        assert_eq!(p.velocity, Vec2::ZERO);
    }
}
