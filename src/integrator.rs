//! One time step of the particle field.
//!
//! Every particle is advanced from its own `front` slot into its own `back`
//! slot and reads nothing else that changes during the step, so the update
//! is order-insensitive and runs across particles in parallel. The same
//! step is mirrored on the device by `physics.wgsl`.

use glam::Vec2;
use rand::{rngs::SmallRng, SeedableRng};
use rayon::prelude::*;

use crate::{
    attractor::{Attractor, DIST_SCALE},
    beam::BeamEmitter,
    particle::{Particle, SpawnPolicy},
};

/// Physical constant with distances measured in `DIST_SCALE` metres.
pub const DEFAULT_GRAVITY: f32 = 6.674e-11 / (DIST_SCALE * DIST_SCALE);
pub const DEFAULT_SOFTENING: f32 = 0.01;
pub const DEFAULT_BEAM_STRENGTH: f32 = 0.25;

/// Tunables of the force law and the beam bias.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepParams {
    pub gravity: f32,
    pub softening: f32,
    pub beam_strength: f32,
    pub seed: u64,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            gravity: DEFAULT_GRAVITY,
            softening: DEFAULT_SOFTENING,
            beam_strength: DEFAULT_BEAM_STRENGTH,
            seed: 0,
        }
    }
}

/// Everything a step reads besides the particles themselves. Held by shared
/// reference for the whole step.
#[derive(Clone, Copy)]
pub struct StepInput<'a> {
    pub attractors: &'a [Attractor],
    pub beam: &'a BeamEmitter,
    /// Where the beam emits from while the cursor is tracked.
    pub emission_origin: Option<Vec2>,
    pub params: &'a StepParams,
    pub spawn: &'a SpawnPolicy,
    pub tick: u64,
}

/// Softened inverse-square pull of every attractor on `position`.
pub fn attractor_acceleration(
    position: Vec2,
    attractors: &[Attractor],
    gravity: f32,
    softening: f32,
) -> Vec2 {
    attractors.iter().fold(Vec2::ZERO, |acc, attractor| {
        let offset = attractor.position - position;
        let dist2 = offset.length_squared() + softening * softening;
        acc + offset * (gravity * attractor.mass / (dist2 * dist2.sqrt()))
    })
}

/// Push along the beam for particles whose bearing from `origin` is inside
/// the cone.
pub fn beam_acceleration(position: Vec2, beam: &BeamEmitter, origin: Vec2, strength: f32) -> Vec2 {
    let offset = position - origin;
    if beam.contains(offset.y.atan2(offset.x)) {
        beam.direction() * strength
    } else {
        Vec2::ZERO
    }
}

/// Advances a single particle. A particle that enters the step dead
/// (`age >= life`) is resampled with `age = 0` instead of integrated.
pub fn advance(index: usize, particle: &Particle, input: &StepInput, dt: f32) -> Particle {
    if particle.is_dead() {
        return respawn(index, input);
    }

    let origin = input.emission_origin.unwrap_or(Vec2::ZERO);
    let acceleration = attractor_acceleration(
        particle.position,
        input.attractors,
        input.params.gravity,
        input.params.softening,
    ) + beam_acceleration(
        particle.position,
        input.beam,
        origin,
        input.params.beam_strength,
    );

    let velocity = particle.velocity + acceleration * dt;
    Particle {
        position: particle.position + velocity * dt,
        age: particle.age + dt,
        life: particle.life,
        velocity,
    }
}

fn respawn(index: usize, input: &StepInput) -> Particle {
    let mut rng = SmallRng::seed_from_u64(particle_seed(input.params.seed, input.tick, index));
    match input.emission_origin {
        Some(origin) => input.spawn.emit(&mut rng, origin, input.beam),
        None => input.spawn.spawn(&mut rng),
    }
}

/// Mixes the run seed, tick and slot into an independent stream per
/// particle and tick.
pub fn particle_seed(seed: u64, tick: u64, index: usize) -> u64 {
    let mut x = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (index as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Writes the successor of every `front` particle into `back` and returns
/// how many were recycled.
pub fn step(front: &[Particle], back: &mut [Particle], input: &StepInput, dt: f32) -> usize {
    debug_assert_eq!(front.len(), back.len());

    back.par_iter_mut()
        .zip(front.par_iter())
        .enumerate()
        .map(|(index, (out, particle))| {
            *out = advance(index, particle, input, dt);
            particle.is_dead() as usize
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(
        attractors: &'a [Attractor],
        beam: &'a BeamEmitter,
        params: &'a StepParams,
        spawn: &'a SpawnPolicy,
    ) -> StepInput<'a> {
        StepInput {
            attractors,
            beam,
            emission_origin: None,
            params,
            spawn,
            tick: 0,
        }
    }

    fn at_rest(position: Vec2) -> Particle {
        Particle {
            position,
            age: 0.0,
            life: 10.0,
            velocity: Vec2::ZERO,
        }
    }

    #[test]
    fn pull_points_toward_attractor() {
        let attractors = [Attractor {
            position: Vec2::new(0.5, 0.5),
            mass: 1.0,
            radius: 0.0,
        }];
        let a = attractor_acceleration(Vec2::new(-0.5, 0.5), &attractors, 1.0, 0.0);

        assert!(a.x > 0.0);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn pull_grows_with_mass_and_fades_with_distance() {
        let light = [Attractor {
            position: Vec2::ZERO,
            mass: 1.0,
            radius: 0.0,
        }];
        let heavy = [Attractor { mass: 2.0, ..light[0] }];

        let near = attractor_acceleration(Vec2::new(0.5, 0.0), &light, 1.0, 0.01).length();
        let far = attractor_acceleration(Vec2::new(1.0, 0.0), &light, 1.0, 0.01).length();
        let near_heavy = attractor_acceleration(Vec2::new(0.5, 0.0), &heavy, 1.0, 0.01).length();

        assert!(near > far);
        assert!(near_heavy > near);
    }

    #[test]
    fn no_attractors_no_pull() {
        assert_eq!(attractor_acceleration(Vec2::ONE, &[], 1.0, 0.01), Vec2::ZERO);
    }

    #[test]
    fn softened_pull_at_zero_distance_is_finite() {
        let attractors = [Attractor {
            position: Vec2::ZERO,
            mass: 1.0e6,
            radius: 0.0,
        }];
        let a = attractor_acceleration(Vec2::ZERO, &attractors, 1.0, 0.01);
        assert_eq!(a, Vec2::ZERO);
    }

    #[test]
    fn beam_pushes_only_inside_cone() {
        let beam = BeamEmitter::new(0.0, 0.5);

        let inside = beam_acceleration(Vec2::new(1.0, 0.1), &beam, Vec2::ZERO, 2.0);
        let outside = beam_acceleration(Vec2::new(-1.0, 0.0), &beam, Vec2::ZERO, 2.0);

        assert!((inside - Vec2::new(2.0, 0.0)).length() < 1e-6);
        assert_eq!(outside, Vec2::ZERO);
    }

    #[test]
    fn beam_bearing_is_measured_from_origin() {
        let beam = BeamEmitter::new(0.0, 0.1);
        let origin = Vec2::new(2.0, 0.0);

        let behind = beam_acceleration(Vec2::new(1.0, 0.0), &beam, origin, 1.0);
        let ahead = beam_acceleration(Vec2::new(3.0, 0.0), &beam, origin, 1.0);

        assert_eq!(behind, Vec2::ZERO);
        assert!(ahead.x > 0.0);
    }

    #[test]
    fn advance_integrates_velocity_then_position() {
        let beam = BeamEmitter::default();
        let params = StepParams {
            beam_strength: 0.0,
            ..Default::default()
        };
        let spawn = SpawnPolicy::default();
        let input = input(&[], &beam, &params, &spawn);

        let p = Particle {
            velocity: Vec2::new(1.0, -2.0),
            ..at_rest(Vec2::ZERO)
        };
        let next = advance(0, &p, &input, 0.5);

        assert_eq!(next.position, Vec2::new(0.5, -1.0));
        assert_eq!(next.velocity, p.velocity);
        assert_eq!(next.age, 0.5);
        assert_eq!(next.life, p.life);
    }

    #[test]
    fn dead_particle_is_resampled() {
        let beam = BeamEmitter::default();
        let params = StepParams::default();
        let spawn = SpawnPolicy::default();
        let input = input(&[], &beam, &params, &spawn);

        let dead = Particle {
            position: Vec2::new(9.0, 9.0),
            age: 5.0,
            life: 5.0,
            velocity: Vec2::new(7.0, 7.0),
        };
        let next = advance(3, &dead, &input, 0.1);

        assert_eq!(next.age, 0.0);
        assert_ne!(next.position, dead.position);
        assert!(next.life >= spawn.life_min && next.life <= spawn.life_max);
    }

    #[test]
    fn dead_particle_emits_from_tracked_origin() {
        let beam = BeamEmitter::new(0.0, 0.0);
        let params = StepParams::default();
        let spawn = SpawnPolicy::default();
        let origin = Vec2::new(-0.3, 0.4);
        let input = StepInput {
            emission_origin: Some(origin),
            ..input(&[], &beam, &params, &spawn)
        };

        let dead = Particle {
            age: 1.0,
            life: 1.0,
            ..at_rest(Vec2::ZERO)
        };
        let next = advance(0, &dead, &input, 0.1);

        assert_eq!(next.position, origin);
        assert!(next.velocity.x > 0.0);
        assert!(next.velocity.y.abs() < 1e-6);
    }

    #[test]
    fn respawn_is_deterministic_per_slot_and_tick() {
        let beam = BeamEmitter::default();
        let params = StepParams::default();
        let spawn = SpawnPolicy::default();
        let input = input(&[], &beam, &params, &spawn);

        assert_eq!(respawn(4, &input), respawn(4, &input));
        assert_ne!(respawn(4, &input), respawn(5, &input));
        assert_ne!(particle_seed(0, 1, 4), particle_seed(0, 2, 4));
    }

    #[test]
    fn step_counts_recycled_particles() {
        let beam = BeamEmitter::default();
        let params = StepParams::default();
        let spawn = SpawnPolicy::default();
        let input = input(&[], &beam, &params, &spawn);

        let front = vec![
            at_rest(Vec2::ZERO),
            Particle {
                age: 10.0,
                ..at_rest(Vec2::ZERO)
            },
            at_rest(Vec2::ONE),
        ];
        let mut back = vec![at_rest(Vec2::ZERO); 3];

        let recycled = step(&front, &mut back, &input, 0.25);

        assert_eq!(recycled, 1);
        assert_eq!(back[0].age, 0.25);
        assert_eq!(back[1].age, 0.0);
        assert_eq!(back[2].position, Vec2::ONE);
    }

    #[test]
    fn negative_dt_runs_time_backwards() {
        let beam = BeamEmitter::default();
        let params = StepParams::default();
        let spawn = SpawnPolicy::default();
        let input = input(&[], &beam, &params, &spawn);

        let p = Particle {
            age: 1.0,
            velocity: Vec2::X,
            ..at_rest(Vec2::ZERO)
        };
        let next = advance(0, &p, &input, -0.5);

        assert_eq!(next.age, 0.5);
        assert_eq!(next.position.x, -0.5);
    }
}
