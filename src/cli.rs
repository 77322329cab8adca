use std::{fmt, str::FromStr};

use clap::Parser;
use glam::Vec2;
use log::warn;

use crate::{
    attractor::{AttractorSet, AVG_DENSITY, DEFAULT_CAPACITY, DIST_SCALE},
    integrator::{StepParams, DEFAULT_BEAM_STRENGTH, DEFAULT_GRAVITY, DEFAULT_SOFTENING},
    particle::SpawnPolicy,
    simulation::SimulationContext,
};

/// An attractor field particle simulation
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Args {
    /// Total particles, rounded up to a multiple of `256` on the GPU
    #[arg(default_value_t = 100_000)]
    pub particles: u32,

    /// The framerate the simulation will run at
    ///
    /// if unset the simulation will run as fast as possible
    #[arg(short, long)]
    pub framerate: Option<u32>,

    /// Multiplier applied to every frame's delta time
    #[arg(short, long, default_value_t = 1.0)]
    pub time_scale: f32,

    /// Maximum number of attractors that can be placed
    #[arg(long, default_value_t = DEFAULT_CAPACITY as u32, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attractors: u32,

    /// Gravitational constant of the attractor pull
    #[arg(short, long, default_value_t = DEFAULT_GRAVITY)]
    pub gravity: f32,

    /// Softening length keeping the pull finite near an attractor
    #[arg(long, default_value_t = DEFAULT_SOFTENING)]
    pub softening: f32,

    /// Attractor density, mass is `4/3·π·r³·density`
    #[arg(long, default_value_t = AVG_DENSITY)]
    pub density: f32,

    /// Metres per unit of screen space, scales drag distance into a radius
    #[arg(long, default_value_t = DIST_SCALE)]
    pub dist_scale: f32,

    #[arg(long, default_value_t = 2.0)]
    pub life_min: f32,

    #[arg(long, default_value_t = 4.0)]
    pub life_max: f32,

    #[arg(long, default_value_t = 0.1)]
    pub speed_min: f32,

    #[arg(long, default_value_t = 0.5)]
    pub speed_max: f32,

    /// Acceleration along the beam for particles inside its cone
    #[arg(long, default_value_t = DEFAULT_BEAM_STRENGTH)]
    pub beam_strength: f32,

    /// Seed for spawning, random if unset
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run this many ticks on the CPU without a window
    #[arg(long, value_name = "TICKS")]
    pub headless: Option<u64>,

    /// Fixed delta time of headless ticks
    #[arg(long, default_value_t = 1.0 / 60.0)]
    pub dt: f32,

    /// Attractor placed at startup as `x,y,radius` in screen space, repeatable
    #[arg(long = "attractor", value_name = "X,Y,RADIUS", allow_hyphen_values = true)]
    pub attractors: Vec<AttractorArg>,
}

impl Args {
    pub fn validate(&self) -> Result<(), ArgsError> {
        if self.particles == 0 {
            return Err(ArgsError::NoParticles);
        }
        if !(self.life_min > 0.0 && self.life_min <= self.life_max) {
            return Err(ArgsError::Range {
                name: "life",
                min: self.life_min,
                max: self.life_max,
            });
        }
        if !(self.speed_min >= 0.0 && self.speed_min <= self.speed_max) {
            return Err(ArgsError::Range {
                name: "speed",
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        Ok(())
    }

    pub fn spawn_policy(&self) -> SpawnPolicy {
        SpawnPolicy {
            life_min: self.life_min,
            life_max: self.life_max,
            speed_min: self.speed_min,
            speed_max: self.speed_max,
            ..Default::default()
        }
    }

    pub fn step_params(&self, seed: u64) -> StepParams {
        StepParams {
            gravity: self.gravity,
            softening: self.softening,
            beam_strength: self.beam_strength,
            seed,
        }
    }

    pub fn attractor_set(&self) -> AttractorSet {
        AttractorSet::new(self.max_attractors as usize, self.density)
    }

    /// The starting context, with the `--attractor` list placed. Entries
    /// past the capacity are logged and dropped.
    pub fn simulation_context(&self, seed: u64) -> SimulationContext {
        let mut ctx =
            SimulationContext::new(self.attractor_set(), self.step_params(seed), self.spawn_policy());

        for attractor in &self.attractors {
            if let Err(e) = ctx
                .attractors
                .add(attractor.position, attractor.radius * self.dist_scale)
            {
                warn!("Ignoring --attractor {:?}: {e}", attractor.position);
            }
        }

        ctx
    }
}

/// `--attractor x,y,radius`; the radius is a screen-space drag length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttractorArg {
    pub position: Vec2,
    pub radius: f32,
}

impl FromStr for AttractorArg {
    type Err = ArgsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ArgsError::Attractor(s.to_owned());

        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| malformed())?;

        match values[..] {
            [x, y, radius] if radius >= 0.0 => Ok(Self {
                position: Vec2::new(x, y),
                radius,
            }),
            _ => Err(malformed()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgsError {
    NoParticles,
    Range { name: &'static str, min: f32, max: f32 },
    Attractor(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::NoParticles => write!(f, "at least one particle is required"),
            ArgsError::Range { name, min, max } => {
                write!(f, "invalid {name} range {min}..{max}")
            }
            ArgsError::Attractor(s) => {
                write!(f, "expected `x,y,radius` with a non-negative radius, got `{s}`")
            }
        }
    }
}

impl std::error::Error for ArgsError {}
