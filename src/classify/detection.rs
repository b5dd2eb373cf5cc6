//! Detection strategy: labeled boxes → fault / ok / none.
//!
//! Precedence within one cycle: any fault-class box → `Fault` (its
//! confidence was already filtered upstream by the detector).  Otherwise
//! any ok-class box at or above the floor → `Ok(max confidence)`.
//! Otherwise `None`.

use log::info;
use serde::{Deserialize, Serialize};

use super::Classification;
use crate::app::ports::{Classifier, Detector, Frame};
use crate::error::ClassifyError;

/// Default confidence floor for ok-class boxes.
pub const DEFAULT_OK_FLOOR: f32 = 0.50;

/// One labeled bounding box (geometry is not needed by the controller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// Which classes mean what, and how sure an ok box has to be.
#[derive(Debug, Clone)]
pub struct DetectionPolicy {
    pub fault_labels: Vec<String>,
    pub ok_labels: Vec<String>,
    pub ok_floor: f32,
}

impl DetectionPolicy {
    /// Collapse one cycle's boxes into a single classification.
    pub fn evaluate(&self, detections: &[Detection]) -> Classification {
        let mut has_fault = false;
        let mut best_ok: Option<f32> = None;

        for det in detections {
            info!("Detected: {} with confidence: {:.3}", det.label, det.confidence);
            if self.fault_labels.iter().any(|l| *l == det.label) {
                has_fault = true;
            } else if self.ok_labels.iter().any(|l| *l == det.label)
                && det.confidence >= self.ok_floor
            {
                best_ok = Some(best_ok.map_or(det.confidence, |b| b.max(det.confidence)));
            }
        }

        if has_fault {
            Classification::Fault
        } else if let Some(confidence) = best_ok {
            Classification::Ok(confidence)
        } else {
            Classification::None
        }
    }
}

impl Default for DetectionPolicy {
    fn default() -> Self {
        Self {
            fault_labels: vec!["lost_pills_back".into(), "lost_pills_front".into()],
            ok_labels: vec!["full_pills_back".into(), "full_pills_front".into()],
            ok_floor: DEFAULT_OK_FLOOR,
        }
    }
}

/// [`Classifier`] that runs the detector on the frame and applies a policy.
pub struct DetectionClassifier<D> {
    detector: D,
    policy: DetectionPolicy,
}

impl<D: Detector> DetectionClassifier<D> {
    pub fn new(detector: D, policy: DetectionPolicy) -> Self {
        Self { detector, policy }
    }
}

impl<D: Detector> Classifier for DetectionClassifier<D> {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError> {
        let detections = self.detector.detect(frame)?;
        Ok(self.policy.evaluate(&detections))
    }
}
