//! Outbound application events.
//!
//! The [`DispenseService`](super::service::DispenseService) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  Adapters on the
//! other side decide what to do with them: log to the console, count them
//! in tests, forward them to a dashboard, etc.

use std::time::Duration;

use super::service::{DispatchReport, DispenseState};
use crate::actuation::{Command, Outcome};
use crate::classify::Classification;
use crate::error::ChannelError;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The service is ready (carries its timing parameters).
    Started {
        sample_interval: Duration,
        cooldown: Duration,
    },

    /// A sampling attempt produced a classification.
    Classified(Classification),

    /// The orchestrator moved between `Idle` and `Dispatching`.
    StateChanged { from: DispenseState, to: DispenseState },

    /// A routine was selected and its cooldown recorded.
    DispatchStarted { outcome: Outcome, steps: usize },

    /// A step's command was written to the channel.
    StepSent { index: usize, command: Command },

    /// A step's command could not be delivered; the routine continues.
    StepFailed {
        index: usize,
        command: Command,
        error: ChannelError,
    },

    /// The routine ran to its end.
    DispatchCompleted(DispatchReport),

    /// A routine matched but the cooldown window is still open.
    CooldownActive { outcome: Outcome, remaining: Duration },

    /// The classification has no routine in the table.
    Unmapped(Outcome),
}
