//! Classification: the per-cycle output of the vision subsystem.
//!
//! Two interchangeable strategies implement the
//! [`Classifier`](crate::app::ports::Classifier) port:
//!
//! | Strategy                 | Engine port        | Produces                   |
//! |--------------------------|--------------------|----------------------------|
//! | [`text::TextMatchClassifier`] | `TextRecognizer` | `Identified` / `None`   |
//! | [`detection::DetectionClassifier`] | `Detector` | `Fault` / `Ok` / `None` |
//!
//! The orchestrator only ever sees [`Classification`].

pub mod detection;
pub mod similarity;
pub mod text;

use core::fmt;

/// Exactly one of these per classification cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// A known medicine name, in its configured spelling.
    Identified(String),
    /// Packaging or placement anomaly.
    Fault,
    /// Nominal state with the highest qualifying confidence.
    Ok(f32),
    /// No usable signal this cycle.
    None,
}

impl Classification {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identified(label) => write!(f, "identified({label})"),
            Self::Fault => write!(f, "fault"),
            Self::Ok(confidence) => write!(f, "ok({confidence:.2})"),
            Self::None => write!(f, "none"),
        }
    }
}
