use std::borrow::Cow;

use wgpu::{util::DeviceExt, BindGroupLayoutEntry};

use crate::{input::Viewport, simulation::SimulationContext};

/// Uniform block shared by `render.wgsl` and `field.wgsl`.
#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, Default, PartialEq)]
pub struct Globals {
    pub scale_x: f32,
    pub scale_y: f32,
    pub gravity: f32,
    pub softening: f32,
    pub attractor_count: u32,
    pub dist_scale: f32,
    pub _pad: [f32; 2],
}

impl Globals {
    pub fn new(viewport: &Viewport, ctx: &SimulationContext, dist_scale: f32) -> Self {
        let scale = viewport.aspect_scale();

        Self {
            scale_x: scale.x,
            scale_y: scale.y,
            gravity: ctx.params.gravity,
            softening: ctx.params.softening,
            attractor_count: ctx.attractors.count() as u32,
            dist_scale,
            _pad: [0.0; 2],
        }
    }
}

/// Field and point pipelines drawing into the swapchain view.
pub struct RenderModule {
    globals_buffer: wgpu::Buffer,
    quad_buffer: wgpu::Buffer,

    bind_group: wgpu::BindGroup,
    field_pipeline: wgpu::RenderPipeline,
    point_pipeline: wgpu::RenderPipeline,
}

impl RenderModule {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        attractor_buffer: &wgpu::Buffer,
    ) -> Self {
        let point_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("points"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("render.wgsl"))),
        });
        let field_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("field"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("field.wgsl"))),
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Two triangles covering clip space.
        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(&[
                -1.0f32, 1.0, -1.0, -1.0, 1.0, -1.0, //
                -1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
            ]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("render"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("render"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: attractor_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("render"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let field_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("field"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &field_shader,
                entry_point: "vertex",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 2 * 4,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &field_shader,
                entry_point: "fragment",
                targets: &[Some(swapchain_format.into())],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // Particle records are read straight from the physics buffer.
        let point_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("points"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &point_shader,
                entry_point: "vertex",
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: 6 * 4,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32, 2 => Float32],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &point_shader,
                entry_point: "fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format: swapchain_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            globals_buffer,
            quad_buffer,

            bind_group,
            field_pipeline,
            point_pipeline,
        }
    }

    pub fn update_globals(&self, queue: &wgpu::Queue, globals: &Globals) {
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(globals));
    }

    pub fn clear(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    pub fn field_pass(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let mut rpass = begin_load_pass(encoder, view, "field");
        rpass.set_pipeline(&self.field_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        rpass.draw(0..6, 0..1);
    }

    pub fn point_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        particle_buffer: &wgpu::Buffer,
        num_particles: u32,
    ) {
        let mut rpass = begin_load_pass(encoder, view, "points");
        rpass.set_pipeline(&self.point_pipeline);
        rpass.set_bind_group(0, &self.bind_group, &[]);
        rpass.set_vertex_buffer(0, particle_buffer.slice(..));
        rpass.draw(0..num_particles, 0..1);
    }
}

/// Opens a pass that draws over what is already in `view`.
pub fn begin_load_pass<'a>(
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    label: &'a str,
) -> wgpu::RenderPass<'a> {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    })
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::input::InputEvent;

    #[test]
    fn globals_match_uniform_size() {
        assert_eq!(std::mem::size_of::<Globals>(), 32);
    }

    #[test]
    fn globals_follow_viewport_and_attractors() {
        let mut ctx = SimulationContext::default();
        ctx.apply(InputEvent::PlaceAttractor {
            position: Vec2::ZERO,
            radius: 10.0,
        });

        let globals = Globals::new(&Viewport::new(800, 400), &ctx, 2.0);
        assert_eq!((globals.scale_x, globals.scale_y), (0.5, 1.0));
        assert_eq!(globals.attractor_count, 1);
        assert_eq!(globals.dist_scale, 2.0);
        assert_eq!(globals.gravity, ctx.params.gravity);
    }
}
