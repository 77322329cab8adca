//! Input plumbing reduced to value events.
//!
//! Window events are translated here into [`InputEvent`]s; the simulation
//! only ever sees those, never the raw pointer or keyboard state.

use glam::Vec2;
use winit::keyboard::KeyCode;

/// Radians (or openness units) per key press.
pub const BEAM_STEP: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PlaceAttractor { position: Vec2, radius: f32 },
    ResetAttractors,
    RotateBeam { delta: f32 },
    WidenBeam { delta: f32 },
    NarrowBeam { delta: f32 },
    ToggleField,
    TogglePoints,
    TrackCursor { enabled: bool },
    CursorMoved { position: Vec2 },
    TogglePause,
    StepOnce,
}

pub fn key_binding(key: KeyCode) -> Option<InputEvent> {
    Some(match key {
        KeyCode::ArrowUp => InputEvent::RotateBeam { delta: BEAM_STEP },
        KeyCode::ArrowDown => InputEvent::RotateBeam { delta: -BEAM_STEP },
        KeyCode::ArrowLeft => InputEvent::WidenBeam { delta: BEAM_STEP },
        KeyCode::ArrowRight => InputEvent::NarrowBeam { delta: BEAM_STEP },
        KeyCode::Digit0 | KeyCode::Numpad0 => InputEvent::ToggleField,
        KeyCode::Digit9 | KeyCode::Numpad9 => InputEvent::TogglePoints,
        KeyCode::KeyR => InputEvent::ResetAttractors,
        KeyCode::Space => InputEvent::TogglePause,
        KeyCode::KeyN => InputEvent::StepOnce,
        _ => return None,
    })
}

/// Window size in physical pixels, used to map the cursor into simulation
/// space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    /// Scale from simulation space to clip space that keeps the square
    /// domain square on a non-square window.
    pub fn aspect_scale(&self) -> Vec2 {
        let (w, h) = (self.width as f32, self.height as f32);
        if w >= h {
            Vec2::new(h / w, 1.0)
        } else {
            Vec2::new(1.0, w / h)
        }
    }

    /// Pixel coordinates (origin top-left) to NDC with `y` up.
    pub fn cursor_to_ndc(&self, x: f64, y: f64) -> Vec2 {
        let (w, h) = (self.width as f64, self.height as f64);
        Vec2::new(
            (x / w * 2.0 - 1.0) as f32,
            ((h - y) / h * 2.0 - 1.0) as f32,
        )
    }

    pub fn cursor_to_world(&self, x: f64, y: f64) -> Vec2 {
        self.cursor_to_ndc(x, y) / self.aspect_scale()
    }
}

/// Press anchors an attractor, release sets its radius by drag distance.
#[derive(Clone, Copy, Debug)]
pub struct PointerDrag {
    anchor: Option<Vec2>,
    dist_scale: f32,
}

impl PointerDrag {
    pub fn new(dist_scale: f32) -> Self {
        Self {
            anchor: None,
            dist_scale,
        }
    }

    pub fn press(&mut self, position: Vec2) {
        self.anchor = Some(position);
    }

    /// A release without a pending press produces nothing.
    pub fn release(&mut self, position: Vec2) -> Option<InputEvent> {
        let anchor = self.anchor.take()?;
        Some(InputEvent::PlaceAttractor {
            position: anchor,
            radius: self.dist_scale * anchor.distance(position),
        })
    }

    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}

/// Last cursor position and whether it is tracked as the emission origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cursor {
    pub tracking: bool,
    pub position: Vec2,
}

impl Cursor {
    pub fn emission_origin(&self) -> Option<Vec2> {
        self.tracking.then_some(self.position)
    }
}
