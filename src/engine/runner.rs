//! The long-running monitor loop: `Idle → Observing → Evaluating →
//! Reporting → (Idle | Stopped)`, strictly sequential, with cooperative
//! cancellation checked at the start of every cycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use crate::core::config::{DeliveryConfig, MonitorConfig};
use crate::core::errors::Result;
use crate::core::observation::Report;
use crate::engine::cycle::{self, AcquisitionPool, Target};
use crate::logger::Diag;
use crate::report::{self, Reporter};

/// Granularity of the inter-cycle sleep; bounds cancellation latency.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Loop position. One state per phase; no phase is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Between cycles, or not yet started.
    Idle,
    /// Acquiring samples from every target.
    Observing,
    /// Mapping samples through thresholds.
    Evaluating,
    /// Handing the assembled report to the reporters.
    Reporting,
    /// Terminal: explicit cancellation or cycle budget exhausted.
    Stopped,
}

/// Why a run ended cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured `max_cycles` budget was spent.
    CyclesExhausted,
    /// The cancellation flag was observed at a cycle boundary.
    Cancelled,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Cycles fully delivered.
    pub cycles: u64,
    /// Why the loop reached `Stopped`.
    pub reason: StopReason,
}

/// Drives the observe-evaluate-report cycle. Holds no cross-cycle
/// measurement state; only the cycle counter and loop position persist.
pub struct Runner {
    interval: Duration,
    acquire_timeout: Duration,
    max_cycles: Option<u64>,
    delivery: DeliveryConfig,
    targets: Vec<Target>,
    reporters: Vec<Box<dyn Reporter>>,
    pool: AcquisitionPool,
    state: LoopState,
    cycles_completed: u64,
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("interval", &self.interval)
            .field("acquire_timeout", &self.acquire_timeout)
            .field("max_cycles", &self.max_cycles)
            .field("delivery", &self.delivery)
            .field("state", &self.state)
            .field("cycles_completed", &self.cycles_completed)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// Build a runner with built-in probes and configured reporters.
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        config.validate()?;
        let targets = config.targets.iter().map(Target::from_config).collect();
        let reporters = report::build(&config.reporters)?;
        Ok(Self::assemble(config, targets, reporters))
    }

    /// Build a runner from pre-built targets and reporters. The seam for
    /// tests and embedders with custom sources or sinks.
    #[must_use]
    pub fn assemble(
        config: &MonitorConfig,
        targets: Vec<Target>,
        reporters: Vec<Box<dyn Reporter>>,
    ) -> Self {
        let pool = AcquisitionPool::new(targets.len());
        Self {
            interval: config.interval(),
            acquire_timeout: config.acquire_timeout(),
            max_cycles: config.max_cycles,
            delivery: config.delivery.clone(),
            targets,
            reporters,
            pool,
            state: LoopState::Idle,
            cycles_completed: 0,
        }
    }

    /// Current loop position.
    #[must_use]
    pub const fn state(&self) -> LoopState {
        self.state
    }

    /// Cycles fully delivered so far.
    #[must_use]
    pub const fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run until cancelled or the cycle budget is spent. A delivery that
    /// still fails after retries aborts the run with the error; completed
    /// reports are never dropped silently.
    pub fn run(&mut self, cancel: &AtomicBool, diag: &Diag) -> Result<RunSummary> {
        diag.info(format!(
            "monitoring {} target(s) every {}s",
            self.targets.len(),
            self.interval.as_secs()
        ));
        loop {
            if cancel.load(Ordering::Relaxed) {
                return Ok(self.stop(StopReason::Cancelled, diag));
            }
            // Budget check comes before the cycle, so max_cycles = N means
            // exactly N deliveries — including N = 0.
            if let Some(max_cycles) = self.max_cycles
                && self.cycles_completed >= max_cycles
            {
                return Ok(self.stop(StopReason::CyclesExhausted, diag));
            }

            let report = self.run_cycle()?;
            self.cycles_completed += 1;
            diag.info(format!(
                "cycle {} delivered, worst={}",
                report.cycle,
                report.worst_status().label()
            ));

            if let Some(max_cycles) = self.max_cycles
                && self.cycles_completed >= max_cycles
            {
                return Ok(self.stop(StopReason::CyclesExhausted, diag));
            }

            self.state = LoopState::Idle;
            self.sleep_interval(cancel);
        }
    }

    /// Perform exactly one observe-evaluate-report cycle and return the
    /// delivered report. Used by one-shot commands.
    pub fn run_cycle(&mut self) -> Result<Report> {
        self.state = LoopState::Observing;
        let acquired = self.pool.acquire(&self.targets, self.acquire_timeout);

        self.state = LoopState::Evaluating;
        let report = cycle::evaluate(
            &self.targets,
            acquired,
            self.cycles_completed + 1,
            self.acquire_timeout,
        );

        self.state = LoopState::Reporting;
        report::deliver_all(&self.reporters, &report, &self.delivery)?;
        Ok(report)
    }

    fn stop(&mut self, reason: StopReason, diag: &Diag) -> RunSummary {
        self.state = LoopState::Stopped;
        match reason {
            StopReason::Cancelled => diag.info("cancellation requested, stopping cleanly"),
            StopReason::CyclesExhausted => diag.info(format!(
                "cycle budget of {} spent, stopping",
                self.cycles_completed
            )),
        }
        RunSummary {
            cycles: self.cycles_completed,
            reason,
        }
    }

    /// Sleep the configured interval in small slices so a cancellation
    /// request is picked up within one slice.
    fn sleep_interval(&self, cancel: &AtomicBool) {
        let mut remaining = self.interval;
        while !remaining.is_zero() && !cancel.load(Ordering::Relaxed) {
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
