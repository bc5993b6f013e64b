//! Observation data model: one evaluated measurement per target per cycle,
//! assembled into a whole-cycle report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::errors::VigilError;

/// Evaluated health of a single observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The measured value is below every threshold.
    Ok,
    /// The measured value crossed the warning threshold.
    Warning,
    /// The measured value crossed the critical threshold.
    Critical,
    /// The target could not be observed this cycle (source failure or
    /// acquisition timeout). Never assigned by threshold evaluation.
    Unknown,
}

impl Status {
    /// Short lowercase label, matching the serialized form.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
        }
    }
}

/// A raw measurement handed back by an observation source, before
/// threshold evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The measured datum on the probe's native scale.
    pub value: f64,
    /// Unit of `value`, e.g. `"pct"` or `"secs"`.
    pub unit: &'static str,
    /// Human-readable context for the measurement.
    pub detail: String,
}

/// One measured datum plus its evaluated status. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Identifier of what was observed. Never empty.
    pub target: String,
    /// Measured value; `None` when the status is `Unknown`.
    pub value: Option<f64>,
    /// Human-readable context (probe detail or failure reason).
    pub detail: String,
    /// Evaluated health.
    pub status: Status,
    /// Time of measurement (or of the failure that replaced it).
    pub timestamp: DateTime<Utc>,
}

impl Observation {
    /// Build an observation from a successful measurement.
    #[must_use]
    pub fn measured(target: impl Into<String>, sample: &Sample, status: Status) -> Self {
        Self {
            target: target.into(),
            value: Some(sample.value),
            detail: sample.detail.clone(),
            status,
            timestamp: Utc::now(),
        }
    }

    /// Build an `Unknown` observation from a per-target acquisition failure.
    #[must_use]
    pub fn unavailable(target: impl Into<String>, error: &VigilError) -> Self {
        Self {
            target: target.into(),
            value: None,
            detail: error.to_string(),
            status: Status::Unknown,
            timestamp: Utc::now(),
        }
    }
}

/// The complete, ordered set of observations produced by one monitoring
/// cycle. Constructed in full before any reporter sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// 1-based cycle counter.
    pub cycle: u64,
    /// When the cycle began acquiring data.
    pub started_at: DateTime<Utc>,
    /// When the last observation was evaluated.
    pub finished_at: DateTime<Utc>,
    /// One observation per configured target, in configuration order.
    pub observations: Vec<Observation>,
}

impl Report {
    /// Worst status across all observations, for summary lines.
    /// `Unknown` outranks everything except `Critical`.
    #[must_use]
    pub fn worst_status(&self) -> Status {
        let mut worst = Status::Ok;
        for observation in &self.observations {
            worst = match (worst, observation.status) {
                (_, Status::Critical) | (Status::Critical, _) => Status::Critical,
                (_, Status::Unknown) | (Status::Unknown, _) => Status::Unknown,
                (_, Status::Warning) | (Status::Warning, _) => Status::Warning,
                (Status::Ok, Status::Ok) => Status::Ok,
            };
        }
        worst
    }
}
