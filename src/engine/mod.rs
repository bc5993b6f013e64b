//! The monitor loop: parallel acquisition with a deadline, threshold
//! evaluation, whole-report assembly, and delivery with retry.

pub mod cycle;
pub mod runner;

pub use cycle::Target;
pub use runner::{LoopState, RunSummary, Runner, StopReason};
