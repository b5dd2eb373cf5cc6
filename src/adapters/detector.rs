//! External object-detector adapter.
//!
//! Inference runs in a separate program (the trained pill model).  It is
//! invoked as `<program> [args…] <frame> --conf <upstream>` and must print a
//! JSON array of `{"label": "...", "confidence": 0.0}` boxes on stdout.
//! Boxes below `--conf` are expected to be filtered by the detector itself.

use std::process::Command;

use log::debug;

use crate::app::ports::{Detector, Frame};
use crate::classify::detection::Detection;
use crate::config::DetectionConfig;
use crate::error::ClassifyError;

pub struct CommandDetector {
    program: String,
    args: Vec<String>,
    upstream_confidence: f32,
}

impl CommandDetector {
    /// `command[0]` is the program, the rest are leading arguments.
    pub fn new(command: &[String], upstream_confidence: f32) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            upstream_confidence,
        })
    }

    pub fn from_config(config: &DetectionConfig) -> Option<Self> {
        Self::new(&config.detector_command, config.upstream_confidence)
    }
}

impl Detector for CommandDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>, ClassifyError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&frame.path)
            .arg("--conf")
            .arg(format!("{:.2}", self.upstream_confidence))
            .output()
            .map_err(|e| ClassifyError::Spawn(e.kind()))?;

        if !output.status.success() {
            debug!(
                "detector stderr: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ClassifyError::EngineFailed(output.status.code()));
        }
        parse_detections(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the detector's stdout.  Blank output means no boxes.
pub fn parse_detections(stdout: &str) -> Result<Vec<Detection>, ClassifyError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|e| {
        debug!("detector output rejected: {}", e);
        ClassifyError::Malformed
    })
}
