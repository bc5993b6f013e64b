//! One observe-evaluate pass: fan acquisition out to worker threads, wait
//! until every target reports or the deadline passes, then evaluate results
//! into an ordered report.
//!
//! Acquisition slots persist across cycles: a worker that misses the
//! deadline stays bound to its slot, and no new worker is spawned for that
//! target until the old one finishes or dies. A permanently blocked probe
//! therefore costs one thread total, not one per cycle.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError, bounded};

use crate::core::config::{TargetConfig, Thresholds};
use crate::core::errors::{Result, VigilError};
use crate::core::observation::{Observation, Report, Sample, Status};
use crate::source::{self, ObservationSource};

/// A configured target bound to its probe instance and thresholds.
pub struct Target {
    /// Identifier carried on every observation.
    pub name: String,
    /// The probe supplying raw samples.
    pub source: Arc<dyn ObservationSource>,
    /// Warn/critical cutoffs for evaluation.
    pub thresholds: Thresholds,
}

impl Target {
    /// Bind a configured target to its built-in probe.
    #[must_use]
    pub fn from_config(config: &TargetConfig) -> Self {
        Self {
            name: config.name.clone(),
            source: source::build(config),
            thresholds: config.probe.thresholds(),
        }
    }
}

/// Per-target acquisition outcome for one cycle.
enum Outcome {
    /// The worker delivered within the deadline.
    Ready(Result<Sample>),
    /// The worker spawned this cycle missed the deadline; it stays bound
    /// to its slot.
    TimedOut,
    /// A worker from an earlier cycle is still running; no new fetch was
    /// started.
    Outstanding,
    /// The worker dropped its channel without sending (probe panicked).
    Crashed,
}

/// Raw per-target acquisition results, positionally aligned with the
/// target slice.
pub struct Acquired {
    /// When acquisition began.
    pub started_at: DateTime<Utc>,
    outcomes: Vec<Outcome>,
}

/// One acquisition slot per target, carried across cycles so in-flight
/// workers are never duplicated.
pub struct AcquisitionPool {
    slots: Vec<Option<Receiver<Result<Sample>>>>,
}

impl AcquisitionPool {
    /// One empty slot per configured target.
    #[must_use]
    pub fn new(target_count: usize) -> Self {
        let mut slots = Vec::new();
        slots.resize_with(target_count, || None);
        Self { slots }
    }

    /// Acquire one sample per target in parallel. Targets whose previous
    /// worker is still running are skipped and reported as outstanding;
    /// everything else gets a fresh worker bounded by the shared deadline.
    /// One slow or failing target never delays or affects the others
    /// beyond that deadline.
    #[must_use]
    pub fn acquire(&mut self, targets: &[Target], timeout: Duration) -> Acquired {
        debug_assert_eq!(self.slots.len(), targets.len());
        let started_at = Utc::now();
        let mut outcomes = Vec::new();
        outcomes.resize_with(targets.len(), || Outcome::Outstanding);

        let mut spawned = Vec::new();
        for (index, target) in targets.iter().enumerate() {
            // Drain a worker that finished (or died) after a previous
            // deadline, freeing the slot for a fresh fetch. The stale
            // sample itself is discarded; this cycle measures now.
            if let Some(receiver) = self.slots[index].take() {
                if matches!(receiver.try_recv(), Err(TryRecvError::Empty)) {
                    self.slots[index] = Some(receiver);
                    continue;
                }
            }
            let (sender, receiver) = bounded(1);
            let source = Arc::clone(&target.source);
            thread::spawn(move || {
                // The receiver may be gone if the cycle timed out; nothing
                // to do with a late sample.
                let _ = sender.send(source.fetch());
            });
            self.slots[index] = Some(receiver);
            spawned.push(index);
        }

        let deadline = Instant::now() + timeout;
        for index in spawned {
            let Some(receiver) = self.slots[index].take() else {
                continue;
            };
            match receiver.recv_deadline(deadline) {
                Ok(result) => outcomes[index] = Outcome::Ready(result),
                Err(RecvTimeoutError::Timeout) => {
                    outcomes[index] = Outcome::TimedOut;
                    // Keep the receiver so the next cycle can tell the
                    // worker is still out there.
                    self.slots[index] = Some(receiver);
                }
                Err(RecvTimeoutError::Disconnected) => outcomes[index] = Outcome::Crashed,
            }
        }
        Acquired {
            started_at,
            outcomes,
        }
    }
}

/// Map a measured value through its thresholds.
#[must_use]
pub fn evaluate_value(value: f64, thresholds: Thresholds) -> Status {
    if value >= thresholds.crit {
        Status::Critical
    } else if value >= thresholds.warn {
        Status::Warning
    } else {
        Status::Ok
    }
}

/// Evaluate acquisition results into a complete report: exactly one
/// observation per target, in target order. Failed, timed-out, or
/// still-outstanding targets become `Unknown` observations.
#[must_use]
pub fn evaluate(targets: &[Target], acquired: Acquired, cycle: u64, timeout: Duration) -> Report {
    let mut observations = Vec::with_capacity(targets.len());
    for (target, outcome) in targets.iter().zip(acquired.outcomes) {
        let observation = match outcome {
            Outcome::Ready(Ok(sample)) => {
                let status = evaluate_value(sample.value, target.thresholds);
                Observation::measured(&target.name, &sample, status)
            }
            Outcome::Ready(Err(error)) => Observation::unavailable(&target.name, &error),
            Outcome::TimedOut => {
                let error = VigilError::AcquireTimeout {
                    target: target.name.clone(),
                    waited: timeout,
                };
                Observation::unavailable(&target.name, &error)
            }
            Outcome::Outstanding => {
                let error = VigilError::unavailable(
                    &target.name,
                    "previous acquisition still outstanding, probe may be blocked",
                );
                Observation::unavailable(&target.name, &error)
            }
            Outcome::Crashed => {
                let error =
                    VigilError::unavailable(&target.name, "probe worker terminated unexpectedly");
                Observation::unavailable(&target.name, &error)
            }
        };
        observations.push(observation);
    }
    Report {
        cycle,
        started_at: acquired.started_at,
        finished_at: Utc::now(),
        observations,
    }
}
