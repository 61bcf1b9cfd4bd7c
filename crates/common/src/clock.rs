//! Clock and timing utilities for the frame loop.
//!
//! Every control session is anchored to a monotonic clock epoch recorded
//! when the session starts. This module provides utilities for:
//! - Capturing the epoch and stamping frames against it
//! - Deriving the frame period from a refresh rate
//! - Throttling periodic work to a target rate

use std::time::{Duration, Instant};

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Period of one frame at the given refresh rate.
pub fn frame_period(refresh_rate_hz: u32) -> Duration {
    Duration::from_nanos(1_000_000_000 / refresh_rate_hz.max(1) as u64)
}

/// Rate controller for throttled periodic work.
#[derive(Debug)]
pub struct RateController {
    target_interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller targeting the given Hz rate.
    pub fn new(target_hz: u32) -> Self {
        Self {
            target_interval_ns: 1_000_000_000 / target_hz.max(1) as u64,
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last + self.target_interval_ns => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Target interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.target_interval_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(!clock.epoch_wall().is_empty());
    }

    #[test]
    fn test_frame_period() {
        assert_eq!(frame_period(50), Duration::from_millis(20));
        // A zero rate is treated as 1 Hz rather than dividing by zero.
        assert_eq!(frame_period(0), Duration::from_secs(1));
    }

    #[test]
    fn test_rate_controller() {
        let mut ctrl = RateController::new(4);
        assert!(ctrl.should_tick(0));
        assert!(!ctrl.should_tick(100_000_000));
        assert!(ctrl.should_tick(250_000_000));
        assert_eq!(ctrl.interval_ns(), 250_000_000);
    }
}
