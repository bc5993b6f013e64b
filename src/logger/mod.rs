//! Leveled diagnostic logging to stderr.
//!
//! Diagnostics are separate from report delivery: reporters own stdout and
//! sink files, diagnostics go to stderr. Verbosity travels in an explicit
//! `Diag` handle rather than process-global state.

use std::io::Write;

use chrono::Utc;

/// Diagnostic severity, lowest to highest.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    const fn tag(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Stderr diagnostic sink with a minimum level.
#[derive(Debug, Clone, Copy)]
pub struct Diag {
    min_level: Level,
}

impl Diag {
    #[must_use]
    pub const fn new(min_level: Level) -> Self {
        Self { min_level }
    }

    /// Suppress everything below `Error`; used by one-shot commands whose
    /// stdout is the product.
    #[must_use]
    pub const fn quiet() -> Self {
        Self::new(Level::Error)
    }

    /// Emit at `Debug` level.
    pub fn debug(&self, message: impl AsRef<str>) {
        self.emit(Level::Debug, message.as_ref());
    }

    /// Emit at `Info` level.
    pub fn info(&self, message: impl AsRef<str>) {
        self.emit(Level::Info, message.as_ref());
    }

    /// Emit at `Warn` level.
    pub fn warn(&self, message: impl AsRef<str>) {
        self.emit(Level::Warn, message.as_ref());
    }

    /// Emit at `Error` level.
    pub fn error(&self, message: impl AsRef<str>) {
        self.emit(Level::Error, message.as_ref());
    }

    fn emit(&self, level: Level, message: &str) {
        if level < self.min_level {
            return;
        }
        let stderr = std::io::stderr();
        let mut out = stderr.lock();
        // A failed diagnostic write must never take down the loop.
        let _ = writeln!(
            out,
            "{} {:<5} {message}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            level.tag()
        );
    }
}

impl Default for Diag {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}
