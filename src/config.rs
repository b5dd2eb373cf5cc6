//! Controller configuration parameters
//!
//! All tunable parameters for the dispenser controller.
//! Values can be overridden from a JSON config file or the command line.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::actuation::ActuationTable;
use crate::app::ports::ConfigError;
use crate::classify::detection::{DEFAULT_OK_FLOOR, DetectionPolicy};
use crate::classify::text::{DEFAULT_THRESHOLD_PERCENT, LabelMatcher};
use crate::scheduler::ResamplePolicy;

/// Which classifier drives the dispenser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// OCR + fuzzy match against the known medicine list.
    Text,
    /// Object detection of full/lost pill classes.
    Detection,
}

/// Core controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispenserConfig {
    pub strategy: Strategy,

    // --- Actuator ---
    pub actuator: ActuatorConfig,

    // --- Timing ---
    /// Minimum time between classification attempts (milliseconds)
    pub sample_interval_ms: u64,
    /// Minimum time between two initiated dispenses (seconds)
    pub cooldown_secs: u64,
    /// Where the sampling interval is anchored after a dispatch
    pub resample_after_dispatch: ResamplePolicy,
    /// Idle time per loop iteration (milliseconds)
    pub frame_interval_ms: u64,
    /// Pause after a failed frame acquisition (milliseconds)
    pub sensor_retry_ms: u64,

    // --- Frame source ---
    /// Snapshot files to probe, in order; the first readable one is used
    pub frame_candidates: Vec<PathBuf>,

    // --- Classifiers ---
    pub text: TextConfig,
    pub detection: DetectionConfig,

    // --- Routines ---
    pub table: ActuationTable,
}

/// Remote motor controller endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    pub host: String,
    pub port: u16,
    /// TCP connect/write timeout (milliseconds)
    pub connect_timeout_ms: u64,
}

/// Fuzzy text strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Known medicine names, in match priority order
    pub known_labels: Vec<String>,
    /// Minimum word/label similarity (0-100%)
    pub similarity_threshold_percent: f64,
    /// OCR engine executable
    pub tesseract_path: PathBuf,
    /// OCR language pack
    pub language: String,
}

/// Detection strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detector program and leading arguments; the frame path and
    /// `--conf <upstream_confidence>` are appended
    pub detector_command: Vec<String>,
    /// Confidence cut-off applied by the detector itself
    pub upstream_confidence: f32,
    /// Classes reported as a packaging fault
    pub fault_labels: Vec<String>,
    /// Classes reported as nominal
    pub ok_labels: Vec<String>,
    /// Minimum confidence for an ok-class box to count (0.0-1.0)
    pub ok_confidence_floor: f32,
}

impl DispenserConfig {
    /// Reference timings for the given strategy.
    ///
    /// Text matching samples every 5 s with a 30 s cooldown; detection
    /// samples every 2 s and relies on the routine's own duration instead
    /// of a cooldown.
    pub fn preset(strategy: Strategy) -> Self {
        let (sample_interval_ms, cooldown_secs) = match strategy {
            Strategy::Text => (5_000, 30),
            Strategy::Detection => (2_000, 0),
        };
        Self {
            strategy,
            actuator: ActuatorConfig::default(),
            sample_interval_ms,
            cooldown_secs,
            resample_after_dispatch: ResamplePolicy::Immediately,
            frame_interval_ms: 100,
            sensor_retry_ms: 1_000,
            frame_candidates: (0..5)
                .map(|i| PathBuf::from(format!("/dev/shm/camera{i}.jpg")))
                .collect(),
            text: TextConfig::default(),
            detection: DetectionConfig::default(),
            table: ActuationTable::reference(),
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn sensor_retry(&self) -> Duration {
        Duration::from_millis(self.sensor_retry_ms)
    }

    pub fn label_matcher(&self) -> LabelMatcher {
        LabelMatcher::new(&self.text.known_labels, self.text.similarity_threshold_percent)
    }

    pub fn detection_policy(&self) -> DetectionPolicy {
        DetectionPolicy {
            fault_labels: self.detection.fault_labels.clone(),
            ok_labels: self.detection.ok_labels.clone(),
            ok_floor: self.detection.ok_confidence_floor,
        }
    }

    /// Range-check every field.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.actuator.host.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("actuator.host is empty"));
        }
        if self.actuator.port == 0 {
            return Err(ConfigError::ValidationFailed("actuator.port must be non-zero"));
        }
        if self.actuator.connect_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "actuator.connect_timeout_ms must be non-zero",
            ));
        }
        if self.sample_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("sample_interval_ms must be non-zero"));
        }
        if self.frame_candidates.is_empty() {
            return Err(ConfigError::ValidationFailed("frame_candidates is empty"));
        }

        let threshold = self.text.similarity_threshold_percent;
        if !(threshold > 0.0 && threshold <= 100.0) {
            return Err(ConfigError::ValidationFailed(
                "text.similarity_threshold_percent must be in (0, 100]",
            ));
        }
        let floor = self.detection.ok_confidence_floor;
        if !(0.0..=1.0).contains(&floor) {
            return Err(ConfigError::ValidationFailed(
                "detection.ok_confidence_floor must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.detection.upstream_confidence) {
            return Err(ConfigError::ValidationFailed(
                "detection.upstream_confidence must be in [0, 1]",
            ));
        }

        match self.strategy {
            Strategy::Text => {
                if self.text.known_labels.iter().all(|l| l.trim().is_empty()) {
                    return Err(ConfigError::ValidationFailed("text.known_labels is empty"));
                }
            }
            Strategy::Detection => {
                if self.detection.detector_command.is_empty() {
                    return Err(ConfigError::ValidationFailed(
                        "detection.detector_command is empty",
                    ));
                }
            }
        }

        self.table.validate()
    }
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self::preset(Strategy::Text)
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            host: "192.168.4.1".into(),
            port: 80,
            connect_timeout_ms: 3_000,
        }
    }
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            known_labels: ["rosulip", "ultrafen", "clovix", "naproxan"]
                .into_iter()
                .map(String::from)
                .collect(),
            similarity_threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            tesseract_path: PathBuf::from("tesseract"),
            language: "eng".into(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let policy = DetectionPolicy::default();
        Self {
            detector_command: vec!["pill-detector".into()],
            upstream_confidence: 0.55,
            fault_labels: policy.fault_labels,
            ok_labels: policy.ok_labels,
            ok_confidence_floor: DEFAULT_OK_FLOOR,
        }
    }
}
