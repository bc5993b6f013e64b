//! Report sinks and delivery: fan-out to every configured reporter with
//! jittered retry. A completed report is never silently dropped — delivery
//! either succeeds everywhere or surfaces a `DeliveryFailure`.

pub mod console;
pub mod jsonl;

use std::thread;
use std::time::Duration;

use rand::Rng;

use crate::core::config::{DeliveryConfig, ReporterSpec};
use crate::core::errors::Result;
use crate::core::observation::Report;

/// Receives completed reports. Implementations must tolerate concurrent
/// callers by serializing writes to their sink.
pub trait Reporter: Send + Sync {
    /// Sink label used in delivery failure messages.
    fn name(&self) -> &'static str;

    /// Hand over one complete report. At-most-once per cycle per reporter;
    /// a failed attempt may be retried by the caller.
    fn deliver(&self, report: &Report) -> Result<()>;
}

/// Instantiate every configured reporter.
pub fn build(specs: &[ReporterSpec]) -> Result<Vec<Box<dyn Reporter>>> {
    specs
        .iter()
        .map(|spec| -> Result<Box<dyn Reporter>> {
            match spec {
                ReporterSpec::Console => Ok(Box::new(console::ConsoleReporter::new())),
                ReporterSpec::Jsonl { path } => {
                    Ok(Box::new(jsonl::JsonlReporter::open(path.clone())?))
                }
            }
        })
        .collect()
}

/// Deliver one report to every reporter, retrying each per the delivery
/// policy. Every reporter is attempted even after one fails; the first
/// exhausted failure is returned afterwards.
pub fn deliver_all(
    reporters: &[Box<dyn Reporter>],
    report: &Report,
    delivery: &DeliveryConfig,
) -> Result<()> {
    let mut first_failure = None;
    for reporter in reporters {
        if let Err(err) = deliver_with_retry(reporter.as_ref(), report, delivery) {
            if first_failure.is_none() {
                first_failure = Some(err);
            }
        }
    }
    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn deliver_with_retry(
    reporter: &dyn Reporter,
    report: &Report,
    delivery: &DeliveryConfig,
) -> Result<()> {
    let mut attempt = 0u32;
    loop {
        match reporter.deliver(report) {
            Ok(()) => return Ok(()),
            Err(err) if attempt < delivery.max_retries && err.is_retryable() => {
                attempt += 1;
                retry_pause(delivery.retry_delay_ms);
            }
            Err(err) => return Err(err),
        }
    }
}

/// Base delay plus uniform jitter so co-failing reporters do not hammer a
/// shared sink in lockstep.
fn retry_pause(base_ms: u64) {
    let jitter = rand::rng().random_range(0..=base_ms / 4);
    thread::sleep(Duration::from_millis(base_ms + jitter));
}
