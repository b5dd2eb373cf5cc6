//! Dispense service: the hexagonal core.
//!
//! [`DispenseService`] owns the actuation table, the dispense cooldown and
//! the `Idle`/`Dispatching` state.  It turns one classification into at most
//! one timed routine.  All I/O flows through port traits injected at call
//! sites, so the whole service is testable with a virtual clock and a
//! recording channel.
//!
//! ```text
//!  Classification ──▶ ┌────────────────────────┐ ──▶ EventSink
//!                     │    DispenseService      │
//!  Clock ◀───────────│  Table · Cooldown · FSM │──▶ CommandChannel
//!                     └────────────────────────┘
//! ```
//!
//! `handle` takes `&mut self` and returns only after the routine's last
//! wait, so at most one routine is ever in flight per service.

use std::time::Duration;

use log::{debug, info, warn};

use super::events::AppEvent;
use super::ports::{Clock, CommandChannel, EventSink};
use crate::actuation::{ActuationTable, Outcome, total_wait};
use crate::classify::Classification;
use crate::config::DispenserConfig;
use crate::cooldown::DispenseCooldown;

// ───────────────────────────────────────────────────────────────
// State and results
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispenseState {
    Idle,
    Dispatching,
}

/// What happened to one executed routine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub outcome: Outcome,
    pub started_at: Duration,
    pub finished_at: Duration,
    pub steps_sent: usize,
    pub steps_failed: usize,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.steps_failed == 0
    }
}

/// Result of handing one classification to the service.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// `Classification::None`: nothing to do.
    NoSignal,
    /// An ok classification below the dispatch floor.
    BelowConfidenceFloor(f32),
    /// No routine is configured for this outcome.
    Unmapped(Outcome),
    /// A routine matched but the cooldown has not elapsed.
    CoolingDown { outcome: Outcome, remaining: Duration },
    /// A routine ran to completion.
    Dispatched(DispatchReport),
}

// ───────────────────────────────────────────────────────────────
// DispenseService
// ───────────────────────────────────────────────────────────────

pub struct DispenseService {
    table: ActuationTable,
    cooldown: DispenseCooldown,
    /// Ok classifications below this confidence never dispatch.
    ok_floor: f32,
    state: DispenseState,
    dispatch_count: u64,
}

impl DispenseService {
    pub fn new(table: ActuationTable, cooldown: DispenseCooldown, ok_floor: f32) -> Self {
        Self {
            table,
            cooldown,
            ok_floor,
            state: DispenseState::Idle,
            dispatch_count: 0,
        }
    }

    pub fn from_config(config: &DispenserConfig) -> Self {
        Self::new(
            config.table.clone(),
            DispenseCooldown::new(config.cooldown()),
            config.detection.ok_confidence_floor,
        )
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sample_interval: Duration, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Started {
            sample_interval,
            cooldown: self.cooldown.duration(),
        });
        info!(
            "DispenseService started: {} routines, cooldown {}s",
            self.table.len(),
            self.cooldown.duration().as_secs()
        );
    }

    // ── Per-sample orchestration ──────────────────────────────

    /// Act on one classification taken at `now`.
    ///
    /// When a routine is due, the cooldown is recorded first, then every
    /// step's command is sent and its wait is slept through `clock`,
    /// regardless of whether the send succeeded.
    pub fn handle(
        &mut self,
        classification: &Classification,
        now: Duration,
        channel: &mut impl CommandChannel,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> Decision {
        let outcome = match classification {
            Classification::None => return Decision::NoSignal,
            Classification::Ok(confidence) if *confidence < self.ok_floor => {
                debug!("Ok confidence {:.2} below floor {:.2}", confidence, self.ok_floor);
                return Decision::BelowConfidenceFloor(*confidence);
            }
            Classification::Ok(_) => Outcome::Ok,
            Classification::Fault => Outcome::Fault,
            Classification::Identified(label) => Outcome::Label(label.clone()),
        };

        let Some(sequence) = self.table.lookup(&outcome).cloned() else {
            info!("No routine for '{}'", outcome);
            sink.emit(&AppEvent::Unmapped(outcome.clone()));
            return Decision::Unmapped(outcome);
        };

        if !self.cooldown.is_ready(now) {
            let remaining = self.cooldown.remaining(now);
            debug!("'{}' suppressed, cooldown {:.1}s left", outcome, remaining.as_secs_f32());
            sink.emit(&AppEvent::CooldownActive {
                outcome: outcome.clone(),
                remaining,
            });
            return Decision::CoolingDown { outcome, remaining };
        }

        // Recorded before the first step so a slow or failing routine
        // cannot be re-triggered mid-flight.
        self.cooldown.record_fire(now);
        self.dispatch_count += 1;
        self.set_state(DispenseState::Dispatching, sink);
        info!(
            "Match found: {} ({} steps, {}s)",
            outcome,
            sequence.len(),
            total_wait(&sequence).as_secs()
        );
        if let Classification::Ok(confidence) = classification {
            info!("High confidence OK detected: {:.3}", confidence);
        }
        sink.emit(&AppEvent::DispatchStarted {
            outcome: outcome.clone(),
            steps: sequence.len(),
        });

        let begun = clock.now();
        let mut steps_sent = 0;
        let mut steps_failed = 0;
        for (index, step) in sequence.iter().enumerate() {
            match channel.send(&step.command) {
                Ok(()) => {
                    steps_sent += 1;
                    sink.emit(&AppEvent::StepSent {
                        index,
                        command: step.command.clone(),
                    });
                }
                Err(error) => {
                    steps_failed += 1;
                    warn!("Connection failed for '{}': {}", step.command, error);
                    sink.emit(&AppEvent::StepFailed {
                        index,
                        command: step.command.clone(),
                        error,
                    });
                }
            }
            clock.sleep(step.wait());
        }

        let report = DispatchReport {
            outcome,
            started_at: now,
            finished_at: now + clock.now().saturating_sub(begun),
            steps_sent,
            steps_failed,
        };
        sink.emit(&AppEvent::DispatchCompleted(report.clone()));
        self.set_state(DispenseState::Idle, sink);
        Decision::Dispatched(report)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> DispenseState {
        self.state
    }

    /// Routines initiated since startup.
    pub fn dispatch_count(&self) -> u64 {
        self.dispatch_count
    }

    pub fn cooldown(&self) -> &DispenseCooldown {
        &self.cooldown
    }

    pub fn table(&self) -> &ActuationTable {
        &self.table
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_state(&mut self, to: DispenseState, sink: &mut impl EventSink) {
        let from = self.state;
        if from != to {
            self.state = to;
            sink.emit(&AppEvent::StateChanged { from, to });
        }
    }
}
