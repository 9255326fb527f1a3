//! Session countdown timer
//!
//! Runs on a coarse one-second cadence, independent of the frame loop. The
//! shell drives it from a 1 Hz interval; tests drive it with scaled time via
//! [`SessionTimer::advance`]. Expiry fires exactly once, then the timer
//! stops itself.

/// Integer-seconds countdown
#[derive(Debug)]
pub struct SessionTimer {
    duration: u32,
    remaining: u32,
    running: bool,
    /// Sub-second time carried between advances
    carry: f32,
}

impl SessionTimer {
    pub fn new(duration_seconds: u32) -> Self {
        Self {
            duration: duration_seconds,
            remaining: duration_seconds,
            running: false,
            carry: 0.0,
        }
    }

    /// Begin counting down. Idempotent: calling while already running is a
    /// no-op and never resets the carry or the count.
    pub fn start(&mut self) {
        if !self.running && self.remaining > 0 {
            self.running = true;
        }
    }

    /// Stop and reinitialize, optionally with a new duration
    pub fn reset(&mut self, duration_seconds: Option<u32>) {
        self.running = false;
        self.carry = 0.0;
        if let Some(duration) = duration_seconds {
            self.duration = duration;
        }
        self.remaining = self.duration;
    }

    /// Advance by elapsed wall-clock seconds, decrementing once per whole
    /// second. Returns true exactly once, on the advance that reaches zero.
    pub fn advance(&mut self, dt_seconds: f32) -> bool {
        if !self.running {
            return false;
        }
        self.carry += dt_seconds.max(0.0);
        while self.carry >= 1.0 && self.remaining > 0 {
            self.carry -= 1.0;
            self.remaining -= 1;
            if self.remaining == 0 {
                self.running = false;
                return true;
            }
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// mm:ss display form
    pub fn format(&self) -> String {
        format!("{:02}:{:02}", self.remaining / 60, self.remaining % 60)
    }
}
