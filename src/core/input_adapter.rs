use glam::Vec2;
use winit::event::WindowEvent;

use super::timer::{IdleTimer, Throttle};

/// Pointer moves are processed at most this often
pub const POINTER_RATE_HZ: f32 = 60.0;
/// Pointer counts as idle this long after its last processed move
pub const POINTER_IDLE_TIMEOUT: f32 = 0.25;

/// Tracks the pointer in normalized device coordinates.
///
/// Moves arriving faster than [`POINTER_RATE_HZ`] are dropped; the pointer is
/// reported active only within [`POINTER_IDLE_TIMEOUT`] of the last accepted move.
#[derive(Debug, Clone)]
pub struct PointerTracker {
    ndc: Option<Vec2>,
    viewport: (f32, f32),
    throttle: Throttle,
    idle: IdleTimer,
    attached: bool,
}

impl PointerTracker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            ndc: None,
            viewport: (width.max(1) as f32, height.max(1) as f32),
            throttle: Throttle::from_hz(POINTER_RATE_HZ),
            idle: IdleTimer::new(POINTER_IDLE_TIMEOUT),
            attached: true,
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.viewport = (width as f32, height as f32);
        }
    }

    /// Pixel position to NDC, +Y up
    pub fn to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
        Vec2::new(x / width * 2.0 - 1.0, -(y / height * 2.0 - 1.0))
    }

    /// Record a move in window pixels at time `now`. Returns false when throttled or detached.
    pub fn on_cursor_moved(&mut self, x: f32, y: f32, now: f32) -> bool {
        if !self.attached || !self.throttle.try_fire(now) {
            return false;
        }

        let (width, height) = self.viewport;
        self.ndc = Some(Self::to_ndc(x, y, width, height));
        self.idle.touch(now);
        true
    }

    /// Process a Winit WindowEvent, returns true if it updated the pointer
    pub fn process_event(&mut self, event: &WindowEvent, now: f32) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.on_cursor_moved(position.x as f32, position.y as f32, now)
            }
            WindowEvent::CursorLeft { .. } => {
                self.idle.reset();
                false
            }
            WindowEvent::Resized(size) => {
                self.set_viewport(size.width, size.height);
                false
            }
            _ => false,
        }
    }

    /// Last known pointer position, regardless of idleness
    pub fn ndc(&self) -> Option<Vec2> {
        self.ndc
    }

    /// Pointer position if it moved recently enough to count as active
    pub fn active_ndc(&self, now: f32) -> Option<Vec2> {
        if self.idle.is_active(now) {
            self.ndc
        } else {
            None
        }
    }

    /// Stop listening; later events are ignored
    pub fn detach(&mut self) {
        self.attached = false;
        self.ndc = None;
        self.idle.reset();
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }
}
