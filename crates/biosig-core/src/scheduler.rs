//! Frame-driven playback scheduling
//!
//! Playback advances a fixed number of samples per animation frame instead of
//! integrating wall-clock time, so frame-rate jitter shows up as small rate
//! drift. [`FrameClock`] provides the 60 Hz tick for hosts without their own
//! animation callback.

use crate::{BiosigError, Result};
use std::time::{Duration, Instant};

/// Frame rate the per-frame sample count is computed for.
pub const TARGET_FRAME_RATE: f64 = 60.0;

/// Number of new samples to pull each frame.
///
/// `max(1, round(sampling_rate × speed / 60))`
#[inline]
pub fn samples_per_frame(sampling_rate: f64, speed: f64) -> usize {
    let step = (sampling_rate * speed / TARGET_FRAME_RATE).round();
    if step.is_finite() && step >= 1.0 {
        step as usize
    } else {
        1
    }
}

/// UI-owned playback controls read once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Whether frames advance the window
    pub is_playing: bool,
    /// Playback speed multiplier (> 0)
    pub speed: f64,
    /// Visible time window in seconds (> 0)
    pub window_seconds: f64,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            speed: 1.0,
            window_seconds: 2.0,
        }
    }
}

impl PlaybackState {
    /// Paused state with the given speed and window.
    pub fn new(speed: f64, window_seconds: f64) -> Result<Self> {
        let state = Self {
            is_playing: false,
            speed,
            window_seconds,
        };
        state.validate()?;
        Ok(state)
    }

    /// Check that speed and window are positive and finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(BiosigError::Validation(format!(
                "playback speed must be positive, got {}",
                self.speed
            )));
        }
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(BiosigError::Validation(format!(
                "window duration must be positive, got {}",
                self.window_seconds
            )));
        }
        Ok(())
    }
}

/// Fixed-tick frame clock.
#[derive(Debug, Clone)]
pub struct FrameClock {
    interval: Duration,
    next: Instant,
    frames: u64,
}

impl FrameClock {
    /// Clock ticking at [`TARGET_FRAME_RATE`].
    pub fn new() -> Self {
        Self::with_rate(TARGET_FRAME_RATE)
    }

    /// Clock ticking `rate` times per second.
    pub fn with_rate(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 {
            rate
        } else {
            TARGET_FRAME_RATE
        };
        let interval = Duration::from_secs_f64(1.0 / rate);
        Self {
            interval,
            next: Instant::now() + interval,
            frames: 0,
        }
    }

    /// Tick interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next frame is due.
    pub fn time_until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Consume a due frame. Returns false when the frame is not due yet.
    ///
    /// Missed frames are dropped rather than replayed in a burst.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.frames += 1;
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    /// Frames ticked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
