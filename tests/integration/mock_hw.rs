//! Mock devices for integration tests.
//!
//! The channel and clock share one timeline so tests can assert on the
//! exact interleaving of sends and waits without a real motor controller.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pilldispenser::actuation::Command;
use pilldispenser::app::events::AppEvent;
use pilldispenser::app::ports::{
    Classifier, Clock, CommandChannel, EventSink, Frame, FrameSource,
};
use pilldispenser::classify::Classification;
use pilldispenser::error::{ChannelError, ClassifyError, SensorError};

// ── Shared timeline ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Send(String),
    Sleep(Duration),
}

pub type Timeline = Rc<RefCell<Vec<Op>>>;

pub fn timeline() -> Timeline {
    Rc::new(RefCell::new(Vec::new()))
}

// ── MockChannel ───────────────────────────────────────────────

pub struct MockChannel {
    timeline: Timeline,
    /// Commands that fail with `Refused` instead of being delivered.
    failing: Vec<String>,
    pub delivered: Vec<Command>,
}

#[allow(dead_code)]
impl MockChannel {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            timeline: Rc::clone(timeline),
            failing: Vec::new(),
            delivered: Vec::new(),
        }
    }

    pub fn failing_on(mut self, command: &str) -> Self {
        self.failing.push(command.to_string());
        self
    }
}

impl CommandChannel for MockChannel {
    fn send(&mut self, command: &Command) -> Result<(), ChannelError> {
        self.timeline
            .borrow_mut()
            .push(Op::Send(command.as_str().to_string()));
        if self.failing.iter().any(|f| f == command.as_str()) {
            return Err(ChannelError::Refused);
        }
        self.delivered.push(command.clone());
        Ok(())
    }
}

// ── MockClock ─────────────────────────────────────────────────

pub struct MockClock {
    now: Duration,
    timeline: Timeline,
}

#[allow(dead_code)]
impl MockClock {
    pub fn new(timeline: &Timeline) -> Self {
        Self {
            now: Duration::ZERO,
            timeline: Rc::clone(timeline),
        }
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl Clock for MockClock {
    fn now(&self) -> Duration {
        self.now
    }

    fn sleep(&mut self, duration: Duration) {
        self.timeline.borrow_mut().push(Op::Sleep(duration));
        self.now += duration;
    }
}

// ── ScriptedClassifier ────────────────────────────────────────

/// Returns scripted results in order, then `Classification::None`.
pub struct ScriptedClassifier {
    script: VecDeque<Result<Classification, ClassifyError>>,
    pub calls: usize,
}

#[allow(dead_code)]
impl ScriptedClassifier {
    pub fn new(script: Vec<Result<Classification, ClassifyError>>) -> Self {
        Self {
            script: script.into(),
            calls: 0,
        }
    }

    pub fn labels(labels: &[Option<&str>]) -> Self {
        Self::new(
            labels
                .iter()
                .map(|l| {
                    Ok(l.map_or(Classification::None, |l| {
                        Classification::Identified(l.to_string())
                    }))
                })
                .collect(),
        )
    }
}

impl Classifier for ScriptedClassifier {
    fn classify(&mut self, _frame: &Frame) -> Result<Classification, ClassifyError> {
        self.calls += 1;
        self.script.pop_front().unwrap_or(Ok(Classification::None))
    }
}

// ── MockFrames ────────────────────────────────────────────────

pub struct MockFrames {
    acquired: u64,
    failure: Option<SensorError>,
    stop_after: Option<(u64, Arc<AtomicBool>)>,
    pub released: bool,
}

#[allow(dead_code)]
impl MockFrames {
    pub fn new() -> Self {
        Self {
            acquired: 0,
            failure: None,
            stop_after: None,
            released: false,
        }
    }

    /// Every acquisition fails with `error`.
    pub fn failing(error: SensorError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Raise `stop` once `frames` acquisitions have been attempted.
    pub fn stop_after(mut self, frames: u64, stop: &Arc<AtomicBool>) -> Self {
        self.stop_after = Some((frames, Arc::clone(stop)));
        self
    }

    pub fn acquired(&self) -> u64 {
        self.acquired
    }
}

impl FrameSource for MockFrames {
    fn acquire(&mut self) -> Result<Frame, SensorError> {
        self.acquired += 1;
        if let Some((limit, stop)) = &self.stop_after {
            if self.acquired >= *limit {
                stop.store(true, Ordering::Release);
            }
        }
        if let Some(error) = self.failure {
            return Err(error);
        }
        Ok(Frame {
            path: PathBuf::from("/dev/shm/camera0.jpg"),
            bytes: 4096,
            sequence: self.acquired,
        })
    }

    fn release(&mut self) {
        self.released = true;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
