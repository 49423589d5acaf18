use std::time::Instant;

/// Longest step handed to the simulation in one frame, in seconds
pub const MAX_FRAME_DELTA: f32 = 0.1;

/// Wall-clock frame timer with a clamped step and a rolling frame-rate window
#[derive(Debug)]
pub struct Clock {
    last_tick: Instant,
    window_frames: u32,
    window_time: f32,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            window_frames: 0,
            window_time: 0.0,
        }
    }

    /// Advance to now. Returns the step to simulate, at most [`MAX_FRAME_DELTA`].
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let raw = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;

        self.window_frames += 1;
        self.window_time += raw;
        raw.min(MAX_FRAME_DELTA)
    }

    /// Average frames per second once `interval` seconds have accumulated,
    /// then starts a fresh window
    pub fn frame_rate(&mut self, interval: f32) -> Option<f32> {
        if self.window_time < interval || self.window_frames == 0 {
            return None;
        }
        let fps = self.window_frames as f32 / self.window_time;
        self.window_frames = 0;
        self.window_time = 0.0;
        Some(fps)
    }

    /// Restart timing from now, e.g. after the window is created
    pub fn reset(&mut self) {
        self.last_tick = Instant::now();
        self.window_frames = 0;
        self.window_time = 0.0;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
