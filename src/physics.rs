use std::borrow::Cow;

use crate::{
    attractor::{Attractor, AttractorSet},
    field::DoubleBuffer,
    particle::Particle,
    simulation::SimulationContext,
    utils::multiple_of,
    PARTICLES_PER_WORKGROUP,
};

/// Uniform block of `physics.wgsl`. Scalars only so the layout is the same
/// on both sides without padding rules.
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, Default, PartialEq)]
pub struct PhysicsParams {
    pub delta_time: f32,
    pub gravity: f32,
    pub softening: f32,
    pub beam_strength: f32,

    pub beam_angle: f32,
    pub beam_openness: f32,
    pub origin_x: f32,
    pub origin_y: f32,

    pub emit_from_origin: u32,
    pub attractor_count: u32,
    pub particle_count: u32,
    pub tick: u32,

    pub seed: u32,
    pub life_min: f32,
    pub life_max: f32,
    pub speed_min: f32,

    pub speed_max: f32,
    pub domain_min_x: f32,
    pub domain_min_y: f32,
    pub domain_max_x: f32,

    pub domain_max_y: f32,
    pub _pad: [f32; 3],
}

impl PhysicsParams {
    pub fn new(ctx: &SimulationContext, particle_count: u32, tick: u64, dt: f32) -> Self {
        let origin = ctx.cursor.emission_origin();
        let seed = ctx.params.seed;

        Self {
            delta_time: dt,
            gravity: ctx.params.gravity,
            softening: ctx.params.softening,
            beam_strength: ctx.params.beam_strength,

            beam_angle: ctx.beam.angle(),
            beam_openness: ctx.beam.openness(),
            origin_x: origin.map_or(0.0, |o| o.x),
            origin_y: origin.map_or(0.0, |o| o.y),

            emit_from_origin: origin.is_some() as u32,
            attractor_count: ctx.attractors.count() as u32,
            particle_count,
            tick: tick as u32,

            seed: (seed ^ (seed >> 32)) as u32,
            life_min: ctx.spawn.life_min,
            life_max: ctx.spawn.life_max,
            speed_min: ctx.spawn.speed_min,

            speed_max: ctx.spawn.speed_max,
            domain_min_x: ctx.spawn.domain_min.x,
            domain_min_y: ctx.spawn.domain_min.y,
            domain_max_x: ctx.spawn.domain_max.x,

            domain_max_y: ctx.spawn.domain_max.y,
            _pad: [0.0; 3],
        }
    }
}

/// The device-side integrator: two particle storage buffers used in
/// ping-pong fashion, the attractor array and the step parameters.
pub struct PhysicsModule {
    pub particles: DoubleBuffer<wgpu::Buffer>,
    pub attractor_buffer: wgpu::Buffer,
    param_buffer: wgpu::Buffer,

    particle_count: u32,
    attractor_capacity: usize,

    bind_groups: [wgpu::BindGroup; 2],
    pipeline: wgpu::ComputePipeline,
}

impl PhysicsModule {
    pub fn new(device: &wgpu::Device, particle_count: u32, attractor_capacity: usize) -> Self {
        let physics_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("physics"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("physics.wgsl"))),
        });

        let param_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Physics Parameter Buffer"),
            size: std::mem::size_of::<PhysicsParams>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Sized to the cap; only the live `count()` records are written.
        let attractor_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Attractor Buffer"),
            size: (std::mem::size_of::<Attractor>() * attractor_capacity.max(1)) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("physics"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage_entry(3, true),
            ],
        });

        let buffer_particles = multiple_of(particle_count, PARTICLES_PER_WORKGROUP);
        let particles = DoubleBuffer::new(
            create_particle_buffer(device, "Particle Buffer A", buffer_particles),
            create_particle_buffer(device, "Particle Buffer B", buffer_particles),
        );

        let [a, b] = particles.buffers();
        let bind_groups = [
            create_bind_group(device, &bind_group_layout, a, b, &param_buffer, &attractor_buffer),
            create_bind_group(device, &bind_group_layout, b, a, &param_buffer, &attractor_buffer),
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("physics"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("physics"),
            layout: Some(&pipeline_layout),
            module: &physics_shader,
            entry_point: "main",
        });

        Self {
            particles,
            attractor_buffer,
            param_buffer,

            particle_count,
            attractor_capacity,

            bind_groups,
            pipeline,
        }
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    /// Seeds both buffers with the same particles.
    pub fn upload(&self, queue: &wgpu::Queue, particles: &[Particle]) {
        let bytes: &[u8] = bytemuck::cast_slice(particles);
        for buffer in self.particles.buffers() {
            queue.write_buffer(buffer, 0, bytes);
        }
    }

    /// Uploads the live attractors as one array.
    pub fn write_attractors(&self, queue: &wgpu::Queue, attractors: &AttractorSet) {
        let live = &attractors.as_slice()[..attractors.count().min(self.attractor_capacity)];
        if !live.is_empty() {
            queue.write_buffer(&self.attractor_buffer, 0, bytemuck::cast_slice(live));
        }
    }

    pub fn write_params(&self, queue: &wgpu::Queue, params: &PhysicsParams) {
        queue.write_buffer(&self.param_buffer, 0, bytemuck::bytes_of(params));
    }

    pub fn front(&self) -> &wgpu::Buffer {
        self.particles.front()
    }

    /// Records the step reading `front` and writing `back`.
    pub fn dispatch(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("physics"),
            timestamp_writes: None,
        });

        cpass.set_pipeline(&self.pipeline);
        cpass.set_bind_group(0, &self.bind_groups[self.particles.current()], &[]);
        cpass.dispatch_workgroups(
            multiple_of(self.particle_count, PARTICLES_PER_WORKGROUP) / PARTICLES_PER_WORKGROUP,
            1,
            1,
        );
    }

    pub fn swap(&mut self) {
        self.particles.swap();
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_particle_buffer(device: &wgpu::Device, label: &str, particles: u32) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<Particle>() * particles as usize) as u64,
        usage: wgpu::BufferUsages::VERTEX
            | wgpu::BufferUsages::STORAGE
            | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    input: &wgpu::Buffer,
    output: &wgpu::Buffer,
    param_buffer: &wgpu::Buffer,
    attractor_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: None,
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: input.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: output.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: param_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: attractor_buffer.as_entire_binding(),
            },
        ],
    })
}
