//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DispenseService (domain)
//! ```
//!
//! Driven adapters (frame source, recognizers, command channel, clock,
//! event sinks, config storage) implement these traits.  The
//! [`DispenseService`](super::service::DispenseService) and the
//! [`SensingLoop`](crate::sensing::SensingLoop) consume them via generics,
//! so the domain core never touches sockets, processes or files directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::actuation::Command;
use crate::classify::Classification;
use crate::classify::detection::Detection;
use crate::config::DispenserConfig;
use crate::error::{ChannelError, ClassifyError, SensorError};

// ───────────────────────────────────────────────────────────────
// Frame source port (driven adapter: camera → domain)
// ───────────────────────────────────────────────────────────────

/// One captured frame, identified by where the capture tool published it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub path: PathBuf,
    /// Size of the frame in bytes at acquisition time.
    pub bytes: u64,
    /// Monotonic acquisition counter for this source.
    pub sequence: u64,
}

/// Read-side port: the sensing loop calls this once per iteration.
pub trait FrameSource {
    /// Acquire the current frame.
    fn acquire(&mut self) -> Result<Frame, SensorError>;

    /// Release the underlying device.  Called once when the loop exits.
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Classifier ports (driven adapters: frame → classification)
// ───────────────────────────────────────────────────────────────

/// Turns one frame into one [`Classification`].
///
/// Errors mean "no usable output this cycle"; the sensing loop logs them
/// and proceeds as if `Classification::None` had been returned.
pub trait Classifier {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError>;
}

/// Optical character recognition engine.
pub trait TextRecognizer {
    /// Recognized text, or `None` when the engine found nothing.
    fn recognize(&mut self, frame: &Frame) -> Result<Option<String>, ClassifyError>;
}

/// Object detector producing labeled, confidence-scored boxes.
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, ClassifyError>;
}

// ───────────────────────────────────────────────────────────────
// Command channel port (driven adapter: domain → actuator)
// ───────────────────────────────────────────────────────────────

/// Send-only path to the remote motor controller.
///
/// Fire-and-forget: `Ok(())` means the command was written, not that the
/// actuator executed it.
pub trait CommandChannel {
    fn send(&mut self, command: &Command) -> Result<(), ChannelError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: domain ↔ time)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source and blocking wait.
///
/// Production uses the OS monotonic clock; tests use a virtual clock whose
/// `sleep` advances time instantly.
pub trait Clock {
    /// Time elapsed since the clock was created.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&mut self, duration: Duration);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller configuration.
///
/// Implementations MUST validate before persisting.  Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] when nothing
    /// is stored so the caller can fall back to a preset.
    fn load(&self) -> Result<DispenserConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &DispenserConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
