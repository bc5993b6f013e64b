//! Observation sources: the seam between the monitor loop and whatever is
//! being measured. Built-in probes cover disk usage, memory pressure, and
//! file staleness.

pub mod disk;
pub mod file;
pub mod memory;

use std::sync::Arc;

use crate::core::config::TargetConfig;
use crate::core::errors::Result;
use crate::core::observation::Sample;

/// Supplies one raw sample per cycle for a single target. Implementations
/// must be safe to call from a worker thread; a probe that cannot reach its
/// target fails with `SourceUnavailable` rather than blocking.
pub trait ObservationSource: Send + Sync {
    /// Probe kind label for diagnostics.
    fn kind(&self) -> &'static str;

    /// Acquire the current raw datum for this source's target.
    fn fetch(&self) -> Result<Sample>;
}

/// Instantiate the built-in probe for a configured target.
#[must_use]
pub fn build(target: &TargetConfig) -> Arc<dyn ObservationSource> {
    use crate::core::config::ProbeSpec;
    match &target.probe {
        ProbeSpec::Disk { path, .. } => {
            Arc::new(disk::DiskProbe::new(target.name.clone(), path.clone()))
        }
        ProbeSpec::Memory { .. } => Arc::new(memory::MemoryProbe::new(target.name.clone())),
        ProbeSpec::File { path, .. } => {
            Arc::new(file::FileProbe::new(target.name.clone(), path.clone()))
        }
    }
}
