//! Fuzzy text strategy: OCR text → known medicine label.
//!
//! Recognized text is lower-cased and split on whitespace.  Words are
//! scanned in their original order and, for each word, labels in table
//! order.  The **first** label whose similarity with the word meets the
//! threshold wins; there is no best-of-all selection.

use log::{debug, info};

use super::Classification;
use super::similarity::ratio;
use crate::app::ports::{Classifier, Frame, TextRecognizer};
use crate::error::ClassifyError;

/// Default similarity threshold, in percent.
pub const DEFAULT_THRESHOLD_PERCENT: f64 = 60.0;

/// Matches free text against a closed, ordered set of known labels.
#[derive(Debug, Clone)]
pub struct LabelMatcher {
    labels: Vec<String>,
    lowered: Vec<String>,
    threshold_percent: f64,
}

impl LabelMatcher {
    pub fn new(labels: &[String], threshold_percent: f64) -> Self {
        Self {
            labels: labels.to_vec(),
            lowered: labels.iter().map(|l| l.to_lowercase()).collect(),
            threshold_percent,
        }
    }

    /// First known label (configured spelling) matching any word of `text`.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        let text = text.to_lowercase();
        for word in text.split_whitespace() {
            for (label, lowered) in self.labels.iter().zip(&self.lowered) {
                let similarity = ratio(word, lowered) * 100.0;
                if similarity >= self.threshold_percent {
                    debug!("'{}' ~ '{}' ({:.1}%)", word, label, similarity);
                    return Some(label);
                }
            }
        }
        None
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// [`Classifier`] that runs OCR on the frame and matches the text.
pub struct TextMatchClassifier<R> {
    recognizer: R,
    matcher: LabelMatcher,
}

impl<R: TextRecognizer> TextMatchClassifier<R> {
    pub fn new(recognizer: R, matcher: LabelMatcher) -> Self {
        Self {
            recognizer,
            matcher,
        }
    }

    pub fn matcher(&self) -> &LabelMatcher {
        &self.matcher
    }
}

impl<R: TextRecognizer> Classifier for TextMatchClassifier<R> {
    fn classify(&mut self, frame: &Frame) -> Result<Classification, ClassifyError> {
        let Some(text) = self.recognizer.recognize(frame)? else {
            return Ok(Classification::None);
        };
        if text.trim().is_empty() {
            return Ok(Classification::None);
        }
        info!("OCR: {}", text.trim());

        Ok(match self.matcher.find_match(&text) {
            Some(label) => Classification::Identified(label.to_string()),
            None => Classification::None,
        })
    }
}
