use log::{debug, warn};
use rand::Rng;

use crate::{
    attractor::AttractorSet,
    beam::BeamEmitter,
    field::{FieldStats, ParticleField},
    input::{Cursor, InputEvent},
    integrator::{self, StepInput, StepParams},
    particle::SpawnPolicy,
    visualizer::{self, Visualizer},
};

/// The per-tick stages a device has to provide. The scheduler calls them in
/// a fixed order: enabled draw passes, then `integrate`, then `swap`.
pub trait Backend {
    /// Background pass shading the attractor field. Reads only.
    fn field_pass(&mut self, ctx: &SimulationContext);

    /// One point per particle of the front buffer. Reads only.
    fn point_pass(&mut self, ctx: &SimulationContext);

    /// Advances `front` into `back`.
    fn integrate(&mut self, ctx: &SimulationContext, tick: u64, dt: f32);

    fn swap(&mut self);
}

/// Everything a tick reads besides the particle buffers. Input events are
/// the only writers and are applied between ticks.
#[derive(Clone, Debug, Default)]
pub struct SimulationContext {
    pub attractors: AttractorSet,
    pub beam: BeamEmitter,
    pub visualizer: Visualizer,
    pub cursor: Cursor,
    pub params: StepParams,
    pub spawn: SpawnPolicy,
}

impl SimulationContext {
    pub fn new(attractors: AttractorSet, params: StepParams, spawn: SpawnPolicy) -> Self {
        Self {
            attractors,
            params,
            spawn,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::PlaceAttractor { position, radius } => {
                match self.attractors.add(position, radius) {
                    Ok(index) => debug!(
                        "Placed attractor {index} at ({:.3}, {:.3}), radius {radius:.0}",
                        position.x, position.y
                    ),
                    Err(e) => warn!("{e}"),
                }
            }
            InputEvent::ResetAttractors => {
                self.attractors.reset();
                debug!("Attractors reset");
            }
            InputEvent::RotateBeam { delta } => {
                self.beam.rotate(delta);
                debug!("Beam angle {:.2}", self.beam.angle());
            }
            InputEvent::WidenBeam { delta } => {
                self.beam.widen(delta);
                debug!("Beam openness {:.2}", self.beam.openness());
            }
            InputEvent::NarrowBeam { delta } => {
                self.beam.narrow(delta);
                debug!("Beam openness {:.2}", self.beam.openness());
            }
            InputEvent::ToggleField => self.visualizer.toggle_field(),
            InputEvent::TogglePoints => self.visualizer.toggle_points(),
            InputEvent::TrackCursor { enabled } => self.cursor.tracking = enabled,
            InputEvent::CursorMoved { position } => self.cursor.position = position,
            InputEvent::TogglePause | InputEvent::StepOnce => (),
        }
    }

    pub fn step_input(&self, tick: u64) -> StepInput<'_> {
        StepInput {
            attractors: self.attractors.as_slice(),
            beam: &self.beam,
            emission_origin: self.cursor.emission_origin(),
            params: &self.params,
            spawn: &self.spawn,
            tick,
        }
    }
}

/// Host-side backend: a [`ParticleField`] integrated with rayon. The point
/// pass reduces the front buffer to [`FieldStats`], the field pass samples
/// the field strength on a coarse grid.
pub struct CpuBackend {
    field: ParticleField,
    field_resolution: usize,

    pub stats: FieldStats,
    pub field_samples: Vec<f32>,
    pub recycled: usize,
}

impl CpuBackend {
    pub fn new(field: ParticleField) -> Self {
        Self {
            field,
            field_resolution: 16,

            stats: FieldStats::default(),
            field_samples: Vec::new(),
            recycled: 0,
        }
    }

    pub fn seeded<R: Rng + ?Sized>(particles: usize, spawn: &SpawnPolicy, rng: &mut R) -> Self {
        Self::new(ParticleField::initialize(particles, spawn, rng))
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Peak of the last field pass.
    pub fn peak_field_strength(&self) -> f32 {
        self.field_samples.iter().copied().fold(0.0, f32::max)
    }
}

impl Backend for CpuBackend {
    fn field_pass(&mut self, ctx: &SimulationContext) {
        self.field_samples = visualizer::sample_field(
            ctx.attractors.as_slice(),
            &ctx.params,
            self.field_resolution,
        );
    }

    fn point_pass(&mut self, _ctx: &SimulationContext) {
        self.stats = FieldStats::collect(self.field.front());
    }

    fn integrate(&mut self, ctx: &SimulationContext, tick: u64, dt: f32) {
        let (front, back) = self.field.front_and_back();
        self.recycled = integrator::step(front, back, &ctx.step_input(tick), dt);
    }

    fn swap(&mut self) {
        self.field.swap();
    }
}
