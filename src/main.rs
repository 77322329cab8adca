use std::sync::Arc;

use attractor_field::{
    cli::Args,
    field::ParticleField,
    framepace::FramePacer,
    gpu::GpuContext,
    gui::{Overlay, OverlayStats},
    headless,
    input::{key_binding, InputEvent, PointerDrag, Viewport},
    physics::{PhysicsModule, PhysicsParams},
    render::{begin_load_pass, Globals, RenderModule},
    scheduler::FrameScheduler,
    simulation::{Backend, SimulationContext},
};
use clap::Parser;
use glam::Vec2;
use log::{error, info, warn};
use rand::{rngs::SmallRng, SeedableRng};
use winit::{
    event::{ElementState, Event, MouseButton, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::PhysicalKey,
    window::{Window, WindowBuilder},
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    // Collect Arguments
    let args = Args::parse();
    args.validate()?;

    if let Some(ticks) = args.headless {
        let summary = headless::run(&args, ticks)?;
        info!(
            "Finished {} ticks, {} particles recycled, peak field strength {:.3}",
            summary.ticks, summary.recycled, summary.peak_field_strength
        );
        return Ok(());
    }

    // Setup Winit
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Attractor Field")
            .build(&event_loop)?,
    );

    let tokio_rt = tokio::runtime::Runtime::new()?;
    let gpu = tokio_rt.block_on(GpuContext::new(window.clone()))?;

    let mut app = App::new(window, gpu, &args);
    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => app.window_event(event, elwt),
        Event::AboutToWait => {
            if let Err(e) = app.frame() {
                error!("{e:#}");
                elwt.exit();
            }
        }
        _ => (),
    })?;

    Ok(())
}

struct App {
    window: Arc<Window>,
    gpu: GpuContext<'static>,
    physics: PhysicsModule,
    render: RenderModule,
    overlay: Overlay,

    scheduler: FrameScheduler,
    pacer: FramePacer,
    viewport: Viewport,
    drag: PointerDrag,
    cursor_px: (f64, f64),
    dist_scale: f32,
}

impl App {
    fn new(window: Arc<Window>, gpu: GpuContext<'static>, args: &Args) -> Self {
        let seed = args.seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(seed);
        info!("Seed {seed}");

        let ctx = args.simulation_context(seed);
        let field = ParticleField::initialize(args.particles as usize, &ctx.spawn, &mut rng);

        let physics = PhysicsModule::new(&gpu.device, args.particles, ctx.attractors.capacity());
        physics.upload(&gpu.queue, field.front());

        let format = gpu.surface_format();
        let render = RenderModule::new(&gpu.device, format, &physics.attractor_buffer);

        let size = window.inner_size();
        let mut overlay = Overlay::new(&gpu.device, format);
        overlay.resize(size.width, size.height);

        let mut scheduler = FrameScheduler::new(ctx);
        scheduler.time_scale = args.time_scale;

        Self {
            window,
            gpu,
            physics,
            render,
            overlay,

            scheduler,
            pacer: FramePacer::new(args.framerate),
            viewport: Viewport::new(size.width, size.height),
            drag: PointerDrag::new(args.dist_scale),
            cursor_px: (0.0, 0.0),
            dist_scale: args.dist_scale,
        }
    }

    fn cursor_world(&self) -> Vec2 {
        self.viewport.cursor_to_world(self.cursor_px.0, self.cursor_px.1)
    }

    fn window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => elwt.exit(),

            WindowEvent::Resized(new_size) => {
                self.gpu.resize(new_size.width, new_size.height);
                self.viewport = Viewport::new(new_size.width, new_size.height);
                self.overlay.resize(new_size.width, new_size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed && !self.overlay.wants_keyboard() {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if let Some(input) = key_binding(code) {
                            self.scheduler.handle(input);
                            return;
                        }
                    }
                }

                self.overlay.key_event(&event);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.overlay.modifiers_event(&modifiers);

                let shift = modifiers.state().shift_key();
                if shift != self.scheduler.ctx.cursor.tracking {
                    self.scheduler.handle(InputEvent::TrackCursor { enabled: shift });
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    let position = self.cursor_world();
                    match state {
                        ElementState::Pressed if !self.overlay.wants_pointer() => {
                            self.drag.press(position)
                        }
                        ElementState::Released => {
                            if let Some(input) = self.drag.release(position) {
                                self.scheduler.handle(input);
                            }
                        }
                        _ => (),
                    }
                }

                self.overlay.mouse_event(state, button);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_px = (position.x, position.y);
                self.overlay
                    .mouse_motion(Vec2::new(position.x as f32, position.y as f32));

                let position = self.cursor_world();
                self.scheduler.handle(InputEvent::CursorMoved { position });
            }

            _ => (),
        }
    }

    fn frame(&mut self) -> anyhow::Result<()> {
        self.pacer.begin_frame();

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                let size = self.window.inner_size();
                self.gpu.resize(size.width, size.height);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring the next frame");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

        // Input applied since the last frame becomes visible to this tick.
        let ctx = &self.scheduler.ctx;
        self.physics.write_attractors(&self.gpu.queue, &ctx.attractors);
        self.render.update_globals(
            &self.gpu.queue,
            &Globals::new(&self.viewport, ctx, self.dist_scale),
        );
        self.render.clear(&mut encoder, &view);

        let mut gpu_frame = GpuFrame {
            queue: &self.gpu.queue,
            encoder: &mut encoder,
            view: &view,
            physics: &mut self.physics,
            render: &self.render,
        };
        self.scheduler.tick(self.pacer.now(), &mut gpu_frame);

        let stats = OverlayStats {
            fps: self.pacer.framerate(),
            particles: self.physics.particle_count(),
        };
        self.overlay.run(&mut self.scheduler, &stats);
        self.overlay.pre_render(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            self.pacer.frametime(),
        );
        {
            let mut rpass = begin_load_pass(&mut encoder, &view, "overlay");
            self.overlay.render(&mut rpass);
        }

        self.gpu.queue.submit(Some(encoder.finish()));
        frame.present();

        self.pacer.end_frame();
        Ok(())
    }
}

/// One frame's worth of device work, recorded into a single encoder.
struct GpuFrame<'a> {
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    view: &'a wgpu::TextureView,
    physics: &'a mut PhysicsModule,
    render: &'a RenderModule,
}

impl Backend for GpuFrame<'_> {
    fn field_pass(&mut self, _ctx: &SimulationContext) {
        self.render.field_pass(self.encoder, self.view);
    }

    fn point_pass(&mut self, _ctx: &SimulationContext) {
        self.render.point_pass(
            self.encoder,
            self.view,
            self.physics.front(),
            self.physics.particle_count(),
        );
    }

    fn integrate(&mut self, ctx: &SimulationContext, tick: u64, dt: f32) {
        let params = PhysicsParams::new(ctx, self.physics.particle_count(), tick, dt);
        self.physics.write_params(self.queue, &params);
        self.physics.dispatch(self.encoder);
    }

    fn swap(&mut self) {
        self.physics.swap();
    }
}
