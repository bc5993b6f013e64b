//! vigil — a small observe-evaluate-report monitoring daemon.
//!
//! Each cycle acquires a sample for every configured target in parallel
//! (bounded by a timeout), evaluates samples against thresholds, assembles
//! the complete ordered report, and hands it to every configured reporter.
//! One failing target never blocks the others; a completed report is never
//! dropped without surfacing a delivery error.

pub mod core;
pub mod engine;
pub mod logger;
pub mod report;
pub mod source;

#[cfg(feature = "cli")]
pub mod cli_app;

#[cfg(feature = "daemon")]
pub mod daemon;
