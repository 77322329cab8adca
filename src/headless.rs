//! Windowless run of the simulation on the CPU backend.

use log::{debug, info};
use rand::{rngs::SmallRng, SeedableRng};

use crate::{
    cli::Args,
    field::FieldStats,
    scheduler::FrameScheduler,
    simulation::CpuBackend,
};

const REPORT_EVERY: u64 = 60;

pub struct HeadlessSummary {
    pub ticks: u64,
    pub stats: FieldStats,
    pub peak_field_strength: f32,
    pub recycled: u64,
}

/// Runs `ticks` ticks at a fixed `dt` with the attractors given on the
/// command line.
pub fn run(args: &Args, ticks: u64) -> anyhow::Result<HeadlessSummary> {
    args.validate()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);

    let ctx = args.simulation_context(seed);

    info!(
        "Headless run: {} particles, {} attractors, {} ticks, dt {}, seed {seed}",
        args.particles,
        ctx.attractors.count(),
        ticks,
        args.dt
    );

    let mut backend = CpuBackend::seeded(args.particles as usize, &ctx.spawn, &mut rng);
    let mut scheduler = FrameScheduler::new(ctx);
    scheduler.time_scale = args.time_scale;

    let mut recycled = 0;
    // One extra tick: the first only establishes the clock (dt = 0).
    for frame in 0..=ticks {
        let report = scheduler.tick(frame as f64 * args.dt as f64, &mut backend);
        recycled += backend.recycled as u64;

        debug!(
            "tick {} dt {:.4} recycled {}",
            report.tick, report.dt, backend.recycled
        );
        if report.tick % REPORT_EVERY == 0 {
            log_stats(report.tick, &backend.stats);
        }
    }

    let stats = FieldStats::collect(backend.field().front());
    log_stats(scheduler.ticks(), &stats);

    Ok(HeadlessSummary {
        ticks: scheduler.ticks(),
        stats,
        peak_field_strength: backend.peak_field_strength(),
        recycled,
    })
}

fn log_stats(tick: u64, stats: &FieldStats) {
    info!(
        "tick {tick}: center of mass ({:.3}, {:.3}), avg velocity ({:.3}, {:.3}), mean age {:.2}",
        stats.center_of_mass.x,
        stats.center_of_mass.y,
        stats.avg_velocity.x,
        stats.avg_velocity.y,
        stats.mean_age,
    );
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn headless_run_advances_every_tick() {
        let args = Args::try_parse_from([
            "attractor_field",
            "1000",
            "--seed",
            "42",
            "--attractor",
            "0,0,0.3",
        ])
        .unwrap();

        let summary = run(&args, 30).unwrap();
        assert_eq!(summary.ticks, 31);
        assert!(summary.peak_field_strength > 0.0);
        assert!(summary.stats.mean_age > 0.0);
    }

    #[test]
    fn headless_rejects_invalid_args() {
        let mut args = Args::try_parse_from(["attractor_field", "10"]).unwrap();
        args.life_min = -1.0;
        assert!(run(&args, 1).is_err());
    }
}
