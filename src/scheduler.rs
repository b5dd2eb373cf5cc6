//! Sampling cadence.
//!
//! Frames are acquired every loop iteration, but classification is
//! expensive (an OCR or detector process per call), so it only runs when
//! the sampling interval has elapsed since the last attempt.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  loop iteration                                              │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  acquire frame ──▶ cadence.poll(now)? ──no──▶ next iteration │
//! │                          │                                   │
//! │                         yes                                  │
//! │                          ▼                                   │
//! │                classify ──▶ DispenseService.handle()         │
//! │                          │                                   │
//! │                          ▼                                   │
//! │         ResamplePolicy decides where the next interval       │
//! │         is measured from after a dispatch                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

/// Where the sampling interval is anchored after a dispatch.
///
/// A dispatch blocks the loop for the whole routine (20–30 s), which is far
/// longer than the sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResamplePolicy {
    /// Keep the anchor at the attempt that triggered the dispatch, so the
    /// first iteration after the routine samples straight away.
    Immediately,
    /// Re-anchor at the end of the routine, so the scene gets a full
    /// interval to settle before the next sample.
    AfterInterval,
}

/// Gate deciding when the next classification attempt is due.
#[derive(Debug, Clone)]
pub struct SamplingCadence {
    interval: Duration,
    /// Anchor of the current interval (`None` = never sampled).
    last_attempt: Option<Duration>,
    /// Number of attempts granted so far.
    attempts: u64,
}

impl SamplingCadence {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_attempt: None,
            attempts: 0,
        }
    }

    /// Whether an attempt would be granted at `now`.
    pub fn is_due(&self, now: Duration) -> bool {
        match self.last_attempt {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }

    /// Grant an attempt if one is due, anchoring the next interval at `now`.
    pub fn poll(&mut self, now: Duration) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_attempt = Some(now);
        self.attempts += 1;
        debug!("Sampling attempt #{} at {:.1}s", self.attempts, now.as_secs_f32());
        true
    }

    /// Move the anchor to `now` without granting an attempt.
    pub fn rearm(&mut self, now: Duration) {
        self.last_attempt = Some(now);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}
