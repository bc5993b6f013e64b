//! File staleness probe: seconds since a file was last modified.
//!
//! Useful for heartbeat files written by other processes — a file that
//! stops being touched is the signal, so the measured value is its age.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::core::errors::{Result, VigilError};
use crate::core::observation::Sample;
use crate::source::ObservationSource;

/// Measures mtime age in seconds. A missing file is a source failure.
#[derive(Debug)]
pub struct FileProbe {
    target: String,
    path: PathBuf,
}

impl FileProbe {
    #[must_use]
    pub const fn new(target: String, path: PathBuf) -> Self {
        Self { target, path }
    }
}

impl ObservationSource for FileProbe {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn fetch(&self) -> Result<Sample> {
        let metadata = std::fs::metadata(&self.path).map_err(|err| {
            VigilError::unavailable(
                &self.target,
                format!("cannot stat {}: {err}", self.path.display()),
            )
        })?;
        let modified = metadata.modified().map_err(|err| {
            VigilError::unavailable(
                &self.target,
                format!("no mtime for {}: {err}", self.path.display()),
            )
        })?;
        // A file touched "in the future" (clock skew, restored backup)
        // counts as fresh.
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or_default();
        Ok(Sample {
            value: age.as_secs_f64(),
            unit: "secs",
            detail: format!(
                "{} modified {}s ago",
                self.path.display(),
                age.as_secs()
            ),
        })
    }
}
