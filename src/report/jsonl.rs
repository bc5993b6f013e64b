//! JSONL reporter: one JSON object per report, appended to a file.
//!
//! The file handle is opened once and kept under a mutex so reports from
//! any thread land as whole lines.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use parking_lot::Mutex;

use crate::core::errors::{Result, VigilError};
use crate::core::observation::Report;
use crate::report::Reporter;

/// Append-only JSON-lines sink.
pub struct JsonlReporter {
    path: PathBuf,
    file: Mutex<File>,
}

impl JsonlReporter {
    /// Open (or create) the sink file for appending, creating parent
    /// directories as needed.
    pub fn open(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| VigilError::io(parent, source))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| VigilError::io(&path, source))?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

impl Reporter for JsonlReporter {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn deliver(&self, report: &Report) -> Result<()> {
        let line = serde_json::to_string(report)?;
        let mut file = self.file.lock();
        writeln!(file, "{line}").map_err(|err| VigilError::DeliveryFailure {
            reporter: "jsonl",
            details: format!("append to {} failed: {err}", self.path.display()),
        })?;
        file.flush().map_err(|err| VigilError::DeliveryFailure {
            reporter: "jsonl",
            details: format!("flush of {} failed: {err}", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::JsonlReporter;
    use crate::core::observation::{Observation, Report, Status};
    use crate::report::Reporter;
    use chrono::Utc;

    fn report(cycle: u64) -> Report {
        let now = Utc::now();
        Report {
            cycle,
            started_at: now,
            finished_at: now,
            observations: vec![Observation {
                target: "root-disk".to_string(),
                value: Some(42.0),
                detail: "42.0% used of /".to_string(),
                status: Status::Ok,
                timestamp: now,
            }],
        }
    }

    #[test]
    fn writes_one_parseable_line_per_report() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports.jsonl");
        let reporter = JsonlReporter::open(path.clone()).expect("open");
        reporter.deliver(&report(1)).expect("first delivery");
        reporter.deliver(&report(2)).expect("second delivery");

        let raw = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Report = serde_json::from_str(lines[1]).expect("line parses as report");
        assert_eq!(parsed.cycle, 2);
        assert_eq!(parsed.observations[0].status, Status::Ok);
    }

    #[test]
    fn open_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/deeper/reports.jsonl");
        let reporter = JsonlReporter::open(path.clone()).expect("open should create parents");
        reporter.deliver(&report(1)).expect("delivery");
        assert!(path.is_file());
    }
}
