//! A GPU-resident, double-buffered particle field pulled around by
//! user-placed point-mass attractors and biased by a directional beam.
//!
//! The simulation core (particles, attractors, beam, integrator, frame
//! scheduling) is plain data plus pure functions and runs on the host as
//! well as on the device. The wgpu modules mirror the same step in WGSL.

pub mod attractor;
pub mod beam;
pub mod cli;
pub mod field;
pub mod framepace;
pub mod gpu;
pub mod gui;
pub mod headless;
pub mod input;
pub mod integrator;
pub mod particle;
pub mod physics;
pub mod render;
pub mod scheduler;
pub mod simulation;
pub mod utils;
pub mod visualizer;

pub const PARTICLES_PER_WORKGROUP: u32 = 256;
