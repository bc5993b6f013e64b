//! VGL-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, VigilError>;

/// Top-level error type for vigil.
#[derive(Debug, Error)]
pub enum VigilError {
    #[error("[VGL-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[VGL-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[VGL-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[VGL-2001] source unavailable for target {target}: {details}")]
    SourceUnavailable { target: String, details: String },

    #[error("[VGL-2002] acquisition timed out for target {target} after {waited:?}")]
    AcquireTimeout { target: String, waited: Duration },

    #[error("[VGL-3001] delivery failure in reporter {reporter}: {details}")]
    DeliveryFailure {
        reporter: &'static str,
        details: String,
    },

    #[error("[VGL-3101] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[VGL-3102] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[VGL-3103] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[VGL-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl VigilError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "VGL-1001",
            Self::MissingConfig { .. } => "VGL-1002",
            Self::ConfigParse { .. } => "VGL-1003",
            Self::SourceUnavailable { .. } => "VGL-2001",
            Self::AcquireTimeout { .. } => "VGL-2002",
            Self::DeliveryFailure { .. } => "VGL-3001",
            Self::Io { .. } => "VGL-3101",
            Self::Serialization { .. } => "VGL-3102",
            Self::ChannelClosed { .. } => "VGL-3103",
            Self::Runtime { .. } => "VGL-3900",
        }
    }

    /// Whether retrying might resolve the failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DeliveryFailure { .. }
                | Self::Io { .. }
                | Self::ChannelClosed { .. }
                | Self::Runtime { .. }
        )
    }

    /// Whether the failure is recovered locally as an `unknown` observation
    /// instead of aborting the cycle.
    #[must_use]
    pub const fn is_per_target(&self) -> bool {
        matches!(
            self,
            Self::SourceUnavailable { .. } | Self::AcquireTimeout { .. }
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for per-target acquisition failures.
    #[must_use]
    pub fn unavailable(target: impl Into<String>, details: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            target: target.into(),
            details: details.into(),
        }
    }
}

impl From<serde_json::Error> for VigilError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for VigilError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
