//! Time adapters.
//!
//! Provides monotonic time queries and blocking waits for the controller.
//!
//! - [`MonotonicClock`]: wraps `std::time::Instant`; `sleep` really blocks.
//! - [`SimClock`]: virtual time for tests and dry runs; `sleep` advances
//!   the clock instantly and records the requested duration.

use std::time::{Duration, Instant};

use crate::app::ports::Clock;

/// Real clock, measured from construction.
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since start (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Virtual clock.  Time only moves when told to.
#[derive(Debug, Default)]
pub struct SimClock {
    now: Duration,
    sleeps: Vec<Duration>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock at `now` instead of zero.
    pub fn starting_at(now: Duration) -> Self {
        Self {
            now,
            sleeps: Vec::new(),
        }
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// Every duration passed to [`Clock::sleep`], in order.
    pub fn sleeps(&self) -> &[Duration] {
        &self.sleeps
    }

    /// Total time spent sleeping.
    pub fn slept(&self) -> Duration {
        self.sleeps.iter().sum()
    }
}

impl Clock for SimClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
        self.now += duration;
    }
}
