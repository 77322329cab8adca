//! Drives one tick of the simulation.
//!
//! Order per tick is fixed: compute `dt`, run the enabled draw passes
//! against the current front buffer, integrate front into back, swap. The
//! frame on screen therefore shows the state produced by the previous tick.

use log::trace;

use crate::{
    input::InputEvent,
    simulation::{Backend, SimulationContext},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockState {
    Uninitialized,
    Running { last: f64 },
}

/// Turns monotonic timestamps (seconds) into per-tick deltas. The first
/// tick has `dt = 0`.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    state: ClockState,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            state: ClockState::Uninitialized,
        }
    }
}

impl FrameClock {
    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn advance(&mut self, now: f64) -> f32 {
        let dt = match self.state {
            ClockState::Uninitialized => 0.0,
            ClockState::Running { last } => (now - last) as f32,
        };
        self.state = ClockState::Running { last: now };
        dt
    }
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub dt: f32,
    pub integrated: bool,
}

/// Owns the simulation context and runs ticks against a [`Backend`].
pub struct FrameScheduler {
    pub ctx: SimulationContext,
    pub time_scale: f32,
    pub paused: bool,

    clock: FrameClock,
    tick: u64,
    step_requested: bool,
}

impl FrameScheduler {
    pub fn new(ctx: SimulationContext) -> Self {
        Self {
            ctx,
            time_scale: 1.0,
            paused: false,

            clock: FrameClock::default(),
            tick: 0,
            step_requested: false,
        }
    }

    /// Number of integrations run so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Applies an input event between ticks.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::TogglePause => self.paused = !self.paused,
            InputEvent::StepOnce => self.step_requested = true,
            event => self.ctx.apply(event),
        }
    }

    /// Runs one tick. While paused the passes still draw but nothing is
    /// integrated, unless a single step was requested.
    pub fn tick<B: Backend + ?Sized>(&mut self, now: f64, backend: &mut B) -> TickReport {
        let dt = self.clock.advance(now) * self.time_scale;
        trace!("tick {} dt {dt:.5}", self.tick);

        self.ctx.visualizer.run(backend, &self.ctx);

        let integrate = !self.paused || std::mem::take(&mut self.step_requested);
        if integrate {
            backend.integrate(&self.ctx, self.tick, dt);
            backend.swap();
            self.tick += 1;
        }

        TickReport {
            tick: self.tick,
            dt,
            integrated: integrate,
        }
    }
}
