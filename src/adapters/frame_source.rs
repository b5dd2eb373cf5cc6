//! Snapshot frame source.
//!
//! The camera itself is driven by an external capture tool that keeps
//! overwriting a snapshot file (e.g. `/dev/shm/camera0.jpg`).  This adapter
//! hands the latest snapshot to the classifier by path.
//!
//! At startup [`probe`] tries each candidate in order and keeps the first
//! one that yields a readable, non-empty frame.  Finding none is fatal.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::{Frame, FrameSource};
use crate::error::SensorError;

pub struct SnapshotFrameSource {
    path: PathBuf,
    sequence: u64,
}

impl SnapshotFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sequence: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for SnapshotFrameSource {
    fn acquire(&mut self) -> Result<Frame, SensorError> {
        let meta = fs::metadata(&self.path)?;
        if !meta.is_file() {
            return Err(SensorError::NoFrame);
        }
        if meta.len() == 0 {
            return Err(SensorError::Empty);
        }
        self.sequence += 1;
        Ok(Frame {
            path: self.path.clone(),
            bytes: meta.len(),
            sequence: self.sequence,
        })
    }

    fn release(&mut self) {
        info!("Frame source {} released", self.path.display());
    }
}

/// First candidate that currently yields a frame.
pub fn probe<P: AsRef<Path>>(candidates: &[P]) -> Option<SnapshotFrameSource> {
    candidates.iter().enumerate().find_map(|(idx, candidate)| {
        let mut source = SnapshotFrameSource::new(candidate.as_ref());
        match source.acquire() {
            Ok(_) => {
                info!("Using frame source #{} ({})", idx, source.path.display());
                source.sequence = 0;
                Some(source)
            }
            Err(e) => {
                debug!("Frame source #{} ({}) unusable: {}", idx, source.path.display(), e);
                None
            }
        }
    })
}
