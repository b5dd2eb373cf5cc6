//! Tesseract OCR adapter.
//!
//! Runs `<tesseract> <frame> stdout -l <lang>` once per sampling attempt and
//! returns the trimmed text.  The child process is waited on before
//! returning, so nothing outlives the call.

use std::path::PathBuf;
use std::process::Command;

use log::debug;

use crate::app::ports::{Frame, TextRecognizer};
use crate::config::TextConfig;
use crate::error::ClassifyError;

pub struct TesseractRecognizer {
    executable: PathBuf,
    language: String,
}

impl TesseractRecognizer {
    pub fn new(executable: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &TextConfig) -> Self {
        Self::new(config.tesseract_path.clone(), config.language.clone())
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&mut self, frame: &Frame) -> Result<Option<String>, ClassifyError> {
        let output = Command::new(&self.executable)
            .arg(&frame.path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .map_err(|e| ClassifyError::Spawn(e.kind()))?;

        if !output.status.success() {
            debug!(
                "tesseract stderr: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Err(ClassifyError::EngineFailed(output.status.code()));
        }
        Ok(normalize(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Trim engine output; blank output means nothing was recognized.
fn normalize(raw: &str) -> Option<String> {
    let text = raw.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
