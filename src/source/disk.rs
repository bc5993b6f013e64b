//! Disk usage probe: used-space percentage of the filesystem containing a
//! configured path.

use std::path::PathBuf;

use crate::core::errors::{Result, VigilError};
use crate::core::observation::Sample;
use crate::source::ObservationSource;

/// Measures used-space percentage via `statvfs`.
#[derive(Debug)]
pub struct DiskProbe {
    target: String,
    path: PathBuf,
}

impl DiskProbe {
    #[must_use]
    pub const fn new(target: String, path: PathBuf) -> Self {
        Self { target, path }
    }
}

impl ObservationSource for DiskProbe {
    fn kind(&self) -> &'static str {
        "disk"
    }

    #[cfg(unix)]
    fn fetch(&self) -> Result<Sample> {
        let stats = nix::sys::statvfs::statvfs(self.path.as_path()).map_err(|errno| {
            VigilError::unavailable(
                &self.target,
                format!("statvfs failed for {}: {errno}", self.path.display()),
            )
        })?;
        let total = stats.blocks();
        if total == 0 {
            return Err(VigilError::unavailable(
                &self.target,
                format!("filesystem at {} reports zero blocks", self.path.display()),
            ));
        }
        // blocks_available is the unprivileged view, matching what callers
        // of the monitored filesystem actually see.
        let available = stats.blocks_available().min(total);
        #[allow(clippy::cast_precision_loss)]
        let used_pct = (total - available) as f64 / total as f64 * 100.0;
        Ok(Sample {
            value: used_pct,
            unit: "pct",
            detail: format!("{used_pct:.1}% used of {}", self.path.display()),
        })
    }

    #[cfg(not(unix))]
    fn fetch(&self) -> Result<Sample> {
        Err(VigilError::unavailable(
            &self.target,
            "disk probe requires a unix platform",
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::DiskProbe;
    use crate::source::ObservationSource;
    use std::path::PathBuf;

    #[test]
    fn fetch_yields_percentage_in_range() {
        let probe = DiskProbe::new("tmp".to_string(), std::env::temp_dir());
        let sample = probe.fetch().expect("temp dir should be statable");
        assert!((0.0..=100.0).contains(&sample.value), "got {}", sample.value);
        assert_eq!(sample.unit, "pct");
    }

    #[test]
    fn nonexistent_path_is_source_unavailable() {
        let probe = DiskProbe::new(
            "ghost".to_string(),
            PathBuf::from("/nonexistent/vigil/probe"),
        );
        let err = probe.fetch().expect_err("missing path must fail");
        assert_eq!(err.code(), "VGL-2001");
    }
}
