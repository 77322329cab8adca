use egui::Widget;
use glam::Vec2;
use winit::{
    event::{ElementState, KeyEvent, MouseButton},
    keyboard::{Key, NamedKey},
};

use crate::{input::InputEvent, scheduler::FrameScheduler};

/// Values the settings window shows but does not own.
pub struct OverlayStats {
    pub fps: f32,
    pub particles: u32,
}

/// egui on top of the simulation frame.
pub struct Overlay {
    pub ctx: egui::Context,
    raw_input: egui::RawInput,
    modifiers: egui::Modifiers,
    pointer: Vec2,

    renderer: egui_wgpu::Renderer,
    clipped_shapes: Vec<egui::ClippedPrimitive>,
    textures_delta: egui::TexturesDelta,
}

impl Overlay {
    pub fn new(device: &wgpu::Device, swapchain_format: wgpu::TextureFormat) -> Self {
        let renderer = egui_wgpu::Renderer::new(device, swapchain_format, None, 1);

        Self {
            ctx: egui::Context::default(),
            raw_input: egui::RawInput::default(),
            modifiers: Default::default(),
            pointer: Vec2::ZERO,

            renderer,
            clipped_shapes: Vec::new(),
            textures_delta: egui::TexturesDelta::default(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.raw_input.screen_rect = Some(egui::Rect::from_min_size(
            Default::default(),
            egui::Vec2::new(width as f32, height as f32),
        ));
    }

    /// True when the last frame's pointer belongs to an egui window, so
    /// clicks there must not place attractors.
    pub fn wants_pointer(&self) -> bool {
        self.ctx.is_pointer_over_area() || self.ctx.wants_pointer_input()
    }

    pub fn wants_keyboard(&self) -> bool {
        self.ctx.wants_keyboard_input()
    }

    pub fn run(&mut self, scheduler: &mut FrameScheduler, stats: &OverlayStats) {
        let raw_input = std::mem::take(&mut self.raw_input);
        self.ctx.begin_frame(raw_input);
        settings_window(&self.ctx, scheduler, stats);

        let output = self.ctx.end_frame();
        self.clipped_shapes = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        self.textures_delta = output.textures_delta;
    }

    pub fn pre_render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        delta_time: f32,
    ) {
        self.raw_input.predicted_dt = delta_time;

        let screen_descriptor = self.screen_descriptor();
        self.renderer.update_buffers(
            device,
            queue,
            encoder,
            &self.clipped_shapes,
            &screen_descriptor,
        );

        for (id, delta) in &self.textures_delta.set {
            self.renderer.update_texture(device, queue, *id, delta);
        }

        for id in &self.textures_delta.free {
            self.renderer.free_texture(id);
        }
    }

    pub fn render<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>) {
        let screen_descriptor = self.screen_descriptor();
        self.renderer
            .render(rpass, &self.clipped_shapes, &screen_descriptor);
    }

    fn screen_descriptor(&self) -> egui_wgpu::ScreenDescriptor {
        let screen_rect = self.ctx.screen_rect();
        egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_rect.width() as u32, screen_rect.height() as u32],
            pixels_per_point: self.ctx.pixels_per_point(),
        }
    }

    pub fn modifiers_event(&mut self, event: &winit::event::Modifiers) {
        let state = event.state();
        self.modifiers.alt = state.alt_key();
        self.modifiers.ctrl = state.control_key();
        self.modifiers.shift = state.shift_key();
        self.modifiers.mac_cmd = state.super_key();
        self.modifiers.command = state.control_key() | state.super_key();
    }

    pub fn key_event(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        match &event.logical_key {
            Key::Named(key) => {
                if let Some(key) = named_key(*key) {
                    self.raw_input.events.push(egui::Event::Key {
                        key,
                        physical_key: None,
                        pressed,
                        repeat: event.repeat,
                        modifiers: self.modifiers,
                    });
                }
            }
            Key::Character(text) if pressed => {
                self.raw_input.events.push(egui::Event::Text(text.to_string()));
            }
            _ => (),
        }
    }

    pub fn mouse_event(&mut self, state: ElementState, button: MouseButton) {
        let button = match button {
            MouseButton::Left => egui::PointerButton::Primary,
            MouseButton::Right => egui::PointerButton::Secondary,
            MouseButton::Middle => egui::PointerButton::Middle,
            _ => return,
        };

        self.raw_input.events.push(egui::Event::PointerButton {
            pos: egui::Pos2::new(self.pointer.x, self.pointer.y),
            button,
            pressed: state == ElementState::Pressed,
            modifiers: self.modifiers,
        });
    }

    pub fn mouse_motion(&mut self, position: Vec2) {
        self.pointer = position;
        self.raw_input
            .events
            .push(egui::Event::PointerMoved(egui::Pos2::new(
                position.x, position.y,
            )));
    }
}

fn settings_window(ctx: &egui::Context, scheduler: &mut FrameScheduler, stats: &OverlayStats) {
    egui::Window::new("Settings")
        .default_width(160.0)
        .show(ctx, |ui| {
            ui.checkbox(&mut scheduler.paused, "Paused [Space]");
            ui.horizontal(|ui| {
                ui.label("Time scale");
                egui::DragValue::new(&mut scheduler.time_scale)
                    .speed(0.01)
                    .clamp_range(0.0..=10.0)
                    .ui(ui);
            });
            ui.label(format!("FPS {:.1}", stats.fps));
            ui.label(format!("Tick {}", scheduler.ticks()));
            ui.label(format!("Particles {}", stats.particles));

            ui.separator();
            let sim = &mut scheduler.ctx;
            ui.label(format!(
                "Attractors {}/{}",
                sim.attractors.count(),
                sim.attractors.capacity()
            ));
            if ui.button("Reset attractors [R]").clicked() {
                sim.apply(InputEvent::ResetAttractors);
            }

            ui.separator();
            ui.label(format!(
                "Beam angle {:.2} rad\nBeam openness {:.2}",
                sim.beam.angle(),
                sim.beam.openness()
            ));
            ui.label(if sim.cursor.tracking {
                "Emitting from cursor [Shift]"
            } else {
                "Emitting from domain"
            });

            ui.separator();
            ui.checkbox(&mut sim.visualizer.draw_field, "Field [0]");
            ui.checkbox(&mut sim.visualizer.draw_points, "Points [9]");
        });
}

fn named_key(key: NamedKey) -> Option<egui::Key> {
    Some(match key {
        NamedKey::Backspace => egui::Key::Backspace,
        NamedKey::Enter => egui::Key::Enter,
        NamedKey::Tab => egui::Key::Tab,
        NamedKey::Delete => egui::Key::Delete,
        NamedKey::End => egui::Key::End,
        NamedKey::Home => egui::Key::Home,
        NamedKey::ArrowLeft => egui::Key::ArrowLeft,
        NamedKey::ArrowRight => egui::Key::ArrowRight,
        NamedKey::Escape => egui::Key::Escape,
        _ => return None,
    })
}
