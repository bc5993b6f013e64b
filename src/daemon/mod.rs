//! Cooperative shutdown: SIGINT/SIGTERM raise a cancellation flag that the
//! monitor loop checks at each cycle boundary. No report is ever cut off
//! mid-delivery by a signal.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::core::errors::{Result, VigilError};

/// Register SIGINT and SIGTERM to set a shared cancellation flag.
pub fn install_cancel_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&flag)).map_err(|err| {
            VigilError::Runtime {
                details: format!("cannot register handler for signal {signal}: {err}"),
            }
        })?;
    }
    Ok(flag)
}
