//! Unified error types for the dispenser controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! sensing loop's error handling uniform.  All variants are `Copy` so they
//! can be carried through events and dispatch reports without allocation.

use core::fmt;
use std::io;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A command could not be delivered to the actuator.
    Channel(ChannelError),
    /// A frame could not be acquired.
    Sensor(SensorError),
    /// The recognition engine produced no usable output.
    Classify(ClassifyError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel(e) => write!(f, "channel: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Classify(e) => write!(f, "classify: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Channel errors
// ---------------------------------------------------------------------------

/// Failure to hand one command to the remote actuator.
///
/// Never fatal: the orchestrator logs it, counts it, and keeps the
/// sequence's physical timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelError {
    /// The actuator address did not resolve to any socket address.
    Resolve,
    /// The actuator refused the connection.
    Refused,
    /// Connecting or writing took longer than the configured timeout.
    Timeout,
    /// The connection was reset or aborted mid-write.
    Reset,
    /// The command contains a line terminator and would split on the wire.
    MultiLine,
    /// Any other socket error.
    Io(io::ErrorKind),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve => write!(f, "address did not resolve"),
            Self::Refused => write!(f, "connection refused"),
            Self::Timeout => write!(f, "timed out"),
            Self::Reset => write!(f, "connection reset"),
            Self::MultiLine => write!(f, "command spans multiple lines"),
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<io::Error> for ChannelError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Self::Timeout,
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => Self::Reset,
            kind => Self::Io(kind),
        }
    }
}

impl From<ChannelError> for Error {
    fn from(e: ChannelError) -> Self {
        Self::Channel(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// No frame has been published at the source yet.
    NoFrame,
    /// The frame exists but has no content (capture still writing).
    Empty,
    /// Reading the frame failed.
    ReadFailed(io::ErrorKind),
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFrame => write!(f, "no frame available"),
            Self::Empty => write!(f, "frame is empty"),
            Self::ReadFailed(kind) => write!(f, "frame read failed ({kind})"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<io::Error> for SensorError {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NoFrame,
            kind => Self::ReadFailed(kind),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

/// The recognizer or detector could not produce output this cycle.
/// The sensing loop treats every variant as `Classification::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// The external engine could not be started.
    Spawn(io::ErrorKind),
    /// The engine ran but exited unsuccessfully (exit code if any).
    EngineFailed(Option<i32>),
    /// The engine's output could not be parsed.
    Malformed,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn(kind) => write!(f, "engine could not start ({kind})"),
            Self::EngineFailed(Some(code)) => write!(f, "engine exited with status {code}"),
            Self::EngineFailed(None) => write!(f, "engine terminated by signal"),
            Self::Malformed => write!(f, "engine output malformed"),
        }
    }
}

impl std::error::Error for ClassifyError {}

impl From<ClassifyError> for Error {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
