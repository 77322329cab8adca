use glam::Vec2;
use rand::Rng;

use crate::particle::{Particle, SpawnPolicy};

/// Two slots of the same storage: `front` holds the current state, `back`
/// is the write target of the next step. Swapping exchanges an index.
pub struct DoubleBuffer<T> {
    buffers: [T; 2],
    current: usize,
}

impl<T> DoubleBuffer<T> {
    pub fn new(front: T, back: T) -> Self {
        Self {
            buffers: [front, back],
            current: 0,
        }
    }

    /// Index of the buffer currently acting as `front`.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn front(&self) -> &T {
        &self.buffers[self.current]
    }

    pub fn back(&self) -> &T {
        &self.buffers[1 - self.current]
    }

    /// Read view of `front` alongside a write view of `back`. The two never
    /// alias.
    pub fn front_and_back(&mut self) -> (&T, &mut T) {
        let (a, b) = self.buffers.split_at_mut(1);
        if self.current == 0 {
            (&a[0], &mut b[0])
        } else {
            (&b[0], &mut a[0])
        }
    }

    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    pub fn buffers(&self) -> &[T; 2] {
        &self.buffers
    }
}

/// The host-side particle population.
pub type ParticleField = DoubleBuffer<Vec<Particle>>;

impl DoubleBuffer<Vec<Particle>> {
    /// Seeds `n` particles from `policy`. Both buffers receive the same
    /// particles so the first frame is stable whichever is read.
    pub fn initialize<R: Rng + ?Sized>(n: usize, policy: &SpawnPolicy, rng: &mut R) -> Self {
        let particles: Vec<Particle> = (0..n).map(|_| policy.spawn(rng)).collect();
        Self::from_particles(particles)
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        let back = particles.clone();
        Self::new(particles, back)
    }

    pub fn len(&self) -> usize {
        self.front().len()
    }

    pub fn is_empty(&self) -> bool {
        self.front().is_empty()
    }
}

/// Aggregate readout of a particle buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    pub center_of_mass: Vec2,
    pub avg_velocity: Vec2,
    pub min_position: Vec2,
    pub max_position: Vec2,
    pub mean_age: f32,
}

impl FieldStats {
    pub fn collect(particles: &[Particle]) -> Self {
        let Some(first) = particles.first() else {
            return Self::default();
        };

        let mut stats = Self {
            min_position: first.position,
            max_position: first.position,
            ..Default::default()
        };

        for p in particles {
            stats.center_of_mass += p.position;
            stats.avg_velocity += p.velocity;
            stats.mean_age += p.age;
            stats.min_position = stats.min_position.min(p.position);
            stats.max_position = stats.max_position.max(p.position);
        }

        let n = particles.len() as f32;
        stats.center_of_mass /= n;
        stats.avg_velocity /= n;
        stats.mean_age /= n;
        stats
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::SmallRng, SeedableRng};

    use super::*;

    #[test]
    fn initialize_seeds_both_buffers_identically() {
        let mut rng = SmallRng::seed_from_u64(3);
        let field = ParticleField::initialize(512, &SpawnPolicy::default(), &mut rng);

        assert_eq!(field.front().len(), 512);
        assert_eq!(field.back().len(), 512);
        assert_eq!(field.front(), field.back());
        assert!(field.front().iter().all(|p| p.age == 0.0 && p.life > 0.0));
    }

    #[test]
    fn swap_is_an_involution() {
        let mut buffers = DoubleBuffer::new("a", "b");
        assert_eq!((*buffers.front(), *buffers.back()), ("a", "b"));

        buffers.swap();
        assert_eq!((*buffers.front(), *buffers.back()), ("b", "a"));

        buffers.swap();
        assert_eq!((*buffers.front(), *buffers.back()), ("a", "b"));
        assert_eq!(buffers.current(), 0);
    }

    #[test]
    fn front_and_back_follow_current() {
        let mut buffers = DoubleBuffer::new(vec![1], vec![2]);
        {
            let (front, back) = buffers.front_and_back();
            assert_eq!(front, &vec![1]);
            back[0] = 3;
        }
        buffers.swap();
        let (front, back) = buffers.front_and_back();
        assert_eq!(front, &vec![3]);
        assert_eq!(back, &vec![1]);
    }

    #[test]
    fn stats_of_empty_buffer_are_zero() {
        assert_eq!(FieldStats::collect(&[]), FieldStats::default());
    }

    #[test]
    fn stats_average_positions() {
        let particles = [
            Particle {
                position: Vec2::new(-1.0, 0.0),
                age: 1.0,
                life: 2.0,
                velocity: Vec2::X,
            },
            Particle {
                position: Vec2::new(1.0, 2.0),
                age: 3.0,
                life: 4.0,
                velocity: Vec2::Y,
            },
        ];
        let stats = FieldStats::collect(&particles);

        assert_eq!(stats.center_of_mass, Vec2::new(0.0, 1.0));
        assert_eq!(stats.avg_velocity, Vec2::new(0.5, 0.5));
        assert_eq!(stats.min_position, Vec2::new(-1.0, 0.0));
        assert_eq!(stats.max_position, Vec2::new(1.0, 2.0));
        assert_eq!(stats.mean_age, 2.0);
    }
}
