//! Sensing loop: the outer, cooperative driver.
//!
//! Each iteration acquires one frame and, when the sampling cadence
//! allows, classifies it and hands the result to the
//! [`DispenseService`].  Everything runs on one thread: while a routine's
//! waits are in progress no frame is acquired and nothing is classified.
//!
//! ```text
//! ┌───────────────┐   frame    ┌────────────┐  Classification  ┌─────────────────┐
//! │  FrameSource  │──────────▶│ Classifier │────────────────▶│ DispenseService │
//! └───────────────┘            └────────────┘                  └────────┬────────┘
//!         ▲                                                              │ timed commands
//!         │ stop flag checked once per iteration                        ▼
//!   SensingLoop::run                                            CommandChannel
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{Classifier, Clock, CommandChannel, EventSink, FrameSource};
use crate::app::service::{Decision, DispenseService};
use crate::classify::Classification;
use crate::config::DispenserConfig;
use crate::error::SensorError;
use crate::scheduler::{ResamplePolicy, SamplingCadence};

/// What one loop iteration did.
#[derive(Debug, Clone, PartialEq)]
pub enum Cycle {
    /// Frame acquisition failed; the loop paused for the retry delay.
    SensorUnavailable(SensorError),
    /// A frame was acquired but no sample was due.
    Skipped,
    /// A sample was classified and handed to the service.
    Sampled(Decision),
}

pub struct SensingLoop {
    service: DispenseService,
    cadence: SamplingCadence,
    resample: ResamplePolicy,
    frame_interval: std::time::Duration,
    sensor_retry: std::time::Duration,
    iterations: u64,
}

impl SensingLoop {
    pub fn new(service: DispenseService, config: &DispenserConfig) -> Self {
        Self {
            service,
            cadence: SamplingCadence::new(config.sample_interval()),
            resample: config.resample_after_dispatch,
            frame_interval: config.frame_interval(),
            sensor_retry: config.sensor_retry(),
            iterations: 0,
        }
    }

    pub fn from_config(config: &DispenserConfig) -> Self {
        Self::new(DispenseService::from_config(config), config)
    }

    /// Emit the service's start event.  Call once before the first step.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.service.start(self.cadence.interval(), sink);
    }

    /// Run exactly one iteration.
    pub fn step(
        &mut self,
        frames: &mut impl FrameSource,
        classifier: &mut impl Classifier,
        channel: &mut impl CommandChannel,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
    ) -> Cycle {
        self.iterations += 1;

        let frame = match frames.acquire() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Failed to capture frame: {}", e);
                clock.sleep(self.sensor_retry);
                return Cycle::SensorUnavailable(e);
            }
        };

        let now = clock.now();
        if !self.cadence.poll(now) {
            return Cycle::Skipped;
        }

        let classification = classifier.classify(&frame).unwrap_or_else(|e| {
            warn!("Classification unavailable: {}", e);
            Classification::None
        });
        sink.emit(&AppEvent::Classified(classification.clone()));

        let decision = self
            .service
            .handle(&classification, now, channel, clock, sink);
        if matches!(decision, Decision::Dispatched(_))
            && self.resample == ResamplePolicy::AfterInterval
        {
            self.cadence.rearm(clock.now());
        }
        Cycle::Sampled(decision)
    }

    /// Iterate until `stop` is set.  The flag is only checked between
    /// iterations, so an in-flight routine always runs to completion.
    pub fn run(
        &mut self,
        frames: &mut impl FrameSource,
        classifier: &mut impl Classifier,
        channel: &mut impl CommandChannel,
        clock: &mut impl Clock,
        sink: &mut impl EventSink,
        stop: &AtomicBool,
    ) {
        info!("Sensing loop running");
        while !stop.load(Ordering::Acquire) {
            if let Cycle::Skipped | Cycle::Sampled(_) =
                self.step(frames, classifier, channel, clock, sink)
            {
                clock.sleep(self.frame_interval);
            }
        }
        frames.release();
        info!(
            "Sensing loop stopped after {} iterations, {} dispatches",
            self.iterations,
            self.service.dispatch_count()
        );
    }

    pub fn service(&self) -> &DispenseService {
        &self.service
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn sample_attempts(&self) -> u64 {
        self.cadence.attempts()
    }
}
