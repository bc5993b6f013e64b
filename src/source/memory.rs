//! Memory pressure probe: used-memory percentage from /proc/meminfo.

use std::path::Path;

use crate::core::errors::{Result, VigilError};
use crate::core::observation::Sample;
use crate::source::ObservationSource;

const MEMINFO_PATH: &str = "/proc/meminfo";

/// Measures used-memory percentage of the host.
#[derive(Debug)]
pub struct MemoryProbe {
    target: String,
}

impl MemoryProbe {
    #[must_use]
    pub const fn new(target: String) -> Self {
        Self { target }
    }
}

impl ObservationSource for MemoryProbe {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn fetch(&self) -> Result<Sample> {
        let raw = std::fs::read_to_string(Path::new(MEMINFO_PATH)).map_err(|err| {
            VigilError::unavailable(&self.target, format!("cannot read {MEMINFO_PATH}: {err}"))
        })?;
        let (total_kib, available_kib) = parse_meminfo(&raw)
            .ok_or_else(|| VigilError::unavailable(&self.target, "malformed meminfo"))?;
        if total_kib == 0 {
            return Err(VigilError::unavailable(&self.target, "meminfo reports zero total"));
        }
        #[allow(clippy::cast_precision_loss)]
        let used_pct =
            (total_kib.saturating_sub(available_kib)) as f64 / total_kib as f64 * 100.0;
        Ok(Sample {
            value: used_pct,
            unit: "pct",
            detail: format!(
                "{used_pct:.1}% used of {} MiB",
                total_kib / 1024
            ),
        })
    }
}

/// Extract (MemTotal, MemAvailable) in KiB. Returns `None` if either line
/// is absent or unparseable.
fn parse_meminfo(raw: &str) -> Option<(u64, u64)> {
    let mut total = None;
    let mut available = None;
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total = parse_kib(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            available = parse_kib(rest);
        }
        if total.is_some() && available.is_some() {
            break;
        }
    }
    Some((total?, available?))
}

fn parse_kib(rest: &str) -> Option<u64> {
    rest.trim().split_whitespace().next()?.parse().ok()
}
