//! Timestamp-driven timers. Callers pass the current time in seconds,
//! so real clocks and simulated clocks drive them the same way.

/// Throttle - fires at most once per `min_interval`
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    min_interval: f32,
    last_fire: Option<f32>,
}

impl Throttle {
    /// Create throttle that allows `hz` fires per second
    pub fn from_hz(hz: f32) -> Self {
        Self::new(1.0 / hz)
    }

    pub fn new(min_interval: f32) -> Self {
        Self {
            min_interval,
            last_fire: None,
        }
    }

    /// Attempt to fire at `now`, returns true if the guard interval has passed.
    /// Gaps short of the interval by no more than f32 rounding at `now` still fire.
    pub fn try_fire(&mut self, now: f32) -> bool {
        let slack = f32::EPSILON * now.abs().max(1.0);
        match self.last_fire {
            Some(last) if now - last < self.min_interval - slack => false,
            _ => {
                self.last_fire = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// Idle timer - active for `timeout` seconds after the last touch
#[derive(Debug, Clone, Copy)]
pub struct IdleTimer {
    timeout: f32,
    last_activity: Option<f32>,
}

impl IdleTimer {
    pub fn new(timeout: f32) -> Self {
        Self {
            timeout,
            last_activity: None,
        }
    }

    pub fn touch(&mut self, now: f32) {
        self.last_activity = Some(now);
    }

    pub fn is_active(&self, now: f32) -> bool {
        self.last_activity
            .is_some_and(|last| now - last < self.timeout)
    }

    pub fn reset(&mut self) {
        self.last_activity = None;
    }
}
