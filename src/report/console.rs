//! Console reporter: one human-readable block per report on stdout.

use std::io::Write;

use crate::core::errors::{Result, VigilError};
use crate::core::observation::Report;
use crate::report::Reporter;

/// Writes each report as a summary line plus one row per observation.
/// Holding the stdout lock for the whole report keeps blocks from
/// interleaving with other writers.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    /// A stdout reporter; stateless, so construction cannot fail.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn write_to(out: &mut impl Write, report: &Report) -> std::io::Result<()> {
        writeln!(
            out,
            "report #{} {} worst={}",
            report.cycle,
            report.started_at.format("%Y-%m-%dT%H:%M:%SZ"),
            report.worst_status().label()
        )?;
        for observation in &report.observations {
            let value = observation
                .value
                .map_or_else(|| "-".to_string(), |value| format!("{value:.1}"));
            writeln!(
                out,
                "  {:<8} {:<20} {:>8}  {}",
                observation.status.label(),
                observation.target,
                value,
                observation.detail
            )?;
        }
        out.flush()
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver(&self, report: &Report) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        Self::write_to(&mut out, report).map_err(|err| VigilError::DeliveryFailure {
            reporter: "console",
            details: err.to_string(),
        })
    }
}
