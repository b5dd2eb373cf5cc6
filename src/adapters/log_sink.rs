//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (rendered by the binary's subscriber on stderr).
//! A dashboard or MQTT adapter would implement the same trait.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as a tagged single-line record.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                sample_interval,
                cooldown,
            } => {
                info!(
                    "START | sample every {:.1}s | cooldown {:.1}s",
                    sample_interval.as_secs_f32(),
                    cooldown.as_secs_f32()
                );
            }
            AppEvent::Classified(c) if c.is_none() => {
                debug!("SAMPLE | none");
            }
            AppEvent::Classified(c) => {
                info!("SAMPLE | {}", c);
            }
            AppEvent::StateChanged { from, to } => {
                debug!("STATE | {:?} -> {:?}", from, to);
            }
            AppEvent::DispatchStarted { outcome, steps } => {
                info!("DISPATCH | start '{}' ({} steps)", outcome, steps);
            }
            AppEvent::StepSent { index, command } => {
                info!("STEP | #{} sent {}", index, command);
            }
            AppEvent::StepFailed {
                index,
                command,
                error,
            } => {
                warn!("STEP | #{} {} not delivered: {}", index, command, error);
            }
            AppEvent::DispatchCompleted(report) => {
                info!(
                    "DISPATCH | done '{}' in {:.1}s | sent={} failed={}",
                    report.outcome,
                    report.finished_at.saturating_sub(report.started_at).as_secs_f32(),
                    report.steps_sent,
                    report.steps_failed,
                );
            }
            AppEvent::CooldownActive { outcome, remaining } => {
                info!(
                    "COOLDOWN | '{}' suppressed, {:.1}s left",
                    outcome,
                    remaining.as_secs_f32()
                );
            }
            AppEvent::Unmapped(outcome) => {
                info!("UNMAPPED | '{}' has no routine", outcome);
            }
        }
    }
}
