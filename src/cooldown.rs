//! Dispense cooldown.
//!
//! Minimum elapsed time between two initiated dispenses.  Owned by one
//! [`DispenseService`](crate::app::service::DispenseService); lives for the
//! process lifetime only, so a restart resets it.
//!
//! The fire time is recorded **before** the first step of a routine runs,
//! so a slow or failing routine can never be re-triggered mid-flight.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispenseCooldown {
    /// When the last dispense was initiated (`None` = never).
    last_fire: Option<Duration>,
    cooldown: Duration,
}

impl DispenseCooldown {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_fire: None,
            cooldown,
        }
    }

    /// Strictly more than `cooldown` must have elapsed since the last fire.
    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_fire {
            None => true,
            Some(fired) => now.saturating_sub(fired) > self.cooldown,
        }
    }

    /// Time left until the next dispense may start (zero when ready or at
    /// the exact boundary).
    pub fn remaining(&self, now: Duration) -> Duration {
        match self.last_fire {
            None => Duration::ZERO,
            Some(fired) => self.cooldown.saturating_sub(now.saturating_sub(fired)),
        }
    }

    /// Record that a dispense was initiated at `now`.
    pub fn record_fire(&mut self, now: Duration) {
        self.last_fire = Some(now);
    }

    pub fn last_fire(&self) -> Option<Duration> {
        self.last_fire
    }

    pub fn duration(&self) -> Duration {
        self.cooldown
    }
}
