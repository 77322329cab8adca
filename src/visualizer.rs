use glam::Vec2;

use crate::{
    attractor::Attractor,
    integrator::{attractor_acceleration, StepParams},
    simulation::{Backend, SimulationContext},
};

/// Which of the two read-only draw passes run each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Visualizer {
    pub draw_field: bool,
    pub draw_points: bool,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self {
            draw_field: true,
            draw_points: true,
        }
    }
}

impl Visualizer {
    /// Records the enabled passes against the backend's current front
    /// buffer. A disabled pass is skipped entirely.
    pub fn run<B: Backend + ?Sized>(&self, backend: &mut B, ctx: &SimulationContext) {
        if self.draw_field {
            backend.field_pass(ctx);
        }
        if self.draw_points {
            backend.point_pass(ctx);
        }
    }

    pub fn toggle_field(&mut self) {
        self.draw_field = !self.draw_field;
    }

    pub fn toggle_points(&mut self) {
        self.draw_points = !self.draw_points;
    }
}

/// Magnitude of the attractor pull at `position`, the quantity the field
/// pass shades.
pub fn field_strength(position: Vec2, attractors: &[Attractor], params: &StepParams) -> f32 {
    attractor_acceleration(position, attractors, params.gravity, params.softening).length()
}

/// Samples [`field_strength`] on a `resolution × resolution` grid over
/// `[-1, 1]²`, row by row from the bottom.
pub fn sample_field(attractors: &[Attractor], params: &StepParams, resolution: usize) -> Vec<f32> {
    let cell = 2.0 / resolution as f32;
    (0..resolution * resolution)
        .map(|i| {
            let (x, y) = (i % resolution, i / resolution);
            let center = Vec2::new(
                -1.0 + (x as f32 + 0.5) * cell,
                -1.0 + (y as f32 + 0.5) * cell,
            );
            field_strength(center, attractors, params)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Passes(Vec<&'static str>);

    impl Backend for Passes {
        fn field_pass(&mut self, _ctx: &SimulationContext) {
            self.0.push("field");
        }

        fn point_pass(&mut self, _ctx: &SimulationContext) {
            self.0.push("points");
        }

        fn integrate(&mut self, _ctx: &SimulationContext, _tick: u64, _dt: f32) {
            self.0.push("integrate");
        }

        fn swap(&mut self) {
            self.0.push("swap");
        }
    }

    #[test]
    fn disabled_passes_are_skipped() {
        let ctx = SimulationContext::default();
        let mut passes = Passes::default();

        let mut visualizer = Visualizer::default();
        visualizer.run(&mut passes, &ctx);
        assert_eq!(passes.0, ["field", "points"]);

        visualizer.toggle_field();
        passes.0.clear();
        visualizer.run(&mut passes, &ctx);
        assert_eq!(passes.0, ["points"]);

        visualizer.toggle_points();
        passes.0.clear();
        visualizer.run(&mut passes, &ctx);
        assert!(passes.0.is_empty());
    }

    #[test]
    fn field_peaks_next_to_attractor() {
        let attractors = [Attractor {
            position: Vec2::new(0.5, 0.5),
            mass: 1.0,
            radius: 0.0,
        }];
        let params = StepParams {
            gravity: 1.0,
            ..Default::default()
        };

        let grid = sample_field(&attractors, &params, 4);
        assert_eq!(grid.len(), 16);

        // Bottom-left cell is the farthest from the attractor.
        assert!(grid[0] < grid[15]);
        assert!(grid[0] < grid[10]);
    }
}
