//! TOML configuration: targets, reporters, cadence, and delivery policy.
//!
//! Configuration is validated once at startup; nothing past this module
//! has to re-check intervals or target sets.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, VigilError};

/// Default probe cadence in seconds.
const DEFAULT_INTERVAL_SECS: u64 = 60;
/// Default per-target acquisition bound in milliseconds.
const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

/// Top-level monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    /// Seconds between the start of consecutive cycles. Must be positive.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Stop after this many cycles; absent means run until cancelled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cycles: Option<u64>,
    /// Upper bound for a single target acquisition. Must be positive.
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,
    /// Report delivery retry policy.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// What to observe, in report order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// Where completed reports go.
    #[serde(default = "default_reporters")]
    pub reporters: Vec<ReporterSpec>,
}

/// Retry policy for handing a completed report to a reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Additional attempts after the first failed delivery.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Base delay between attempts; actual delay adds uniform jitter.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// One named observation target and its probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Identifier carried on every observation for this target.
    pub name: String,
    /// Probe kind and thresholds.
    #[serde(flatten)]
    pub probe: ProbeSpec,
}

/// Built-in probe kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "snake_case")]
pub enum ProbeSpec {
    /// Used-space percentage of the filesystem containing `path`.
    Disk {
        /// Any path on the filesystem to measure.
        path: PathBuf,
        /// Warning cutoff in percent used.
        #[serde(default = "default_warn_pct")]
        warn_pct: f64,
        /// Critical cutoff in percent used.
        #[serde(default = "default_crit_pct")]
        crit_pct: f64,
    },
    /// Used-memory percentage of the host.
    Memory {
        /// Warning cutoff in percent used.
        #[serde(default = "default_warn_pct")]
        warn_pct: f64,
        /// Critical cutoff in percent used.
        #[serde(default = "default_crit_pct")]
        crit_pct: f64,
    },
    /// Staleness of a file's mtime in seconds. A missing file is a source
    /// failure, not a threshold breach.
    File {
        /// The file whose mtime is watched.
        path: PathBuf,
        /// Warning cutoff in seconds since last modification.
        warn_age_secs: u64,
        /// Critical cutoff in seconds since last modification.
        crit_age_secs: u64,
    },
}

impl ProbeSpec {
    /// Warn/critical cutoffs on the probe's native scale. Higher is worse
    /// for every built-in probe.
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        match self {
            Self::Disk {
                warn_pct, crit_pct, ..
            }
            | Self::Memory { warn_pct, crit_pct } => Thresholds {
                warn: *warn_pct,
                crit: *crit_pct,
            },
            #[allow(clippy::cast_precision_loss)]
            Self::File {
                warn_age_secs,
                crit_age_secs,
                ..
            } => Thresholds {
                warn: *warn_age_secs as f64,
                crit: *crit_age_secs as f64,
            },
        }
    }
}

/// Warn/critical cutoffs; a value at or above `crit` is critical, at or
/// above `warn` is a warning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Warning cutoff on the probe's native scale.
    pub warn: f64,
    /// Critical cutoff on the probe's native scale.
    pub crit: f64,
}

/// Configured report sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReporterSpec {
    /// Human-readable table on stdout.
    Console,
    /// One JSON object per report, appended to `path`.
    Jsonl { path: PathBuf },
}

impl MonitorConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(VigilError::MissingConfig {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| VigilError::io(path, source))?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, fall back to `./vigil.toml` if present, and
    /// otherwise use the built-in default configuration.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new("vigil.toml");
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::builtin_default())
                }
            }
        }
    }

    /// Built-in configuration: root disk and memory to the console, every
    /// 60 seconds.
    #[must_use]
    pub fn builtin_default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            max_cycles: None,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
            delivery: DeliveryConfig::default(),
            targets: vec![
                TargetConfig {
                    name: "root-disk".to_string(),
                    probe: ProbeSpec::Disk {
                        path: PathBuf::from("/"),
                        warn_pct: default_warn_pct(),
                        crit_pct: default_crit_pct(),
                    },
                },
                TargetConfig {
                    name: "memory".to_string(),
                    probe: ProbeSpec::Memory {
                        warn_pct: default_warn_pct(),
                        crit_pct: default_crit_pct(),
                    },
                },
            ],
            reporters: default_reporters(),
        }
    }

    /// Reject configurations that cannot produce a well-formed cycle.
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() {
            return Err(invalid("no targets configured"));
        }
        if self.reporters.is_empty() {
            return Err(invalid("no reporters configured"));
        }
        if self.interval_secs == 0 {
            return Err(invalid("interval_secs must be positive"));
        }
        if self.acquire_timeout_ms == 0 {
            return Err(invalid("acquire_timeout_ms must be positive"));
        }
        let mut seen = HashSet::new();
        for target in &self.targets {
            if target.name.is_empty() {
                return Err(invalid("target name must not be empty"));
            }
            if !seen.insert(target.name.as_str()) {
                return Err(invalid(format!("duplicate target name: {}", target.name)));
            }
            let thresholds = target.probe.thresholds();
            // NaN would slip past the ordering check below and then
            // classify every value Ok.
            if !thresholds.warn.is_finite() || !thresholds.crit.is_finite() {
                return Err(invalid(format!(
                    "target {}: thresholds must be finite numbers",
                    target.name
                )));
            }
            if thresholds.warn > thresholds.crit {
                return Err(invalid(format!(
                    "target {}: warn threshold {} exceeds critical threshold {}",
                    target.name, thresholds.warn, thresholds.crit
                )));
            }
        }
        Ok(())
    }

    /// Sleep between cycle starts.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Per-target acquisition bound.
    #[must_use]
    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| VigilError::Serialization {
            context: "toml",
            details: err.to_string(),
        })
    }
}

fn invalid(details: impl Into<String>) -> VigilError {
    VigilError::InvalidConfig {
        details: details.into(),
    }
}

const fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

const fn default_acquire_timeout_ms() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT_MS
}

const fn default_max_retries() -> u32 {
    1
}

const fn default_retry_delay_ms() -> u64 {
    500
}

const fn default_warn_pct() -> f64 {
    80.0
}

const fn default_crit_pct() -> f64 {
    90.0
}

fn default_reporters() -> Vec<ReporterSpec> {
    vec![ReporterSpec::Console]
}

#[cfg(test)]
mod tests {
    use super::{MonitorConfig, ProbeSpec, ReporterSpec};
    use std::io::Write;
    use std::path::Path;

    fn parse(raw: &str) -> MonitorConfig {
        let config: MonitorConfig = toml::from_str(raw).expect("parse should succeed");
        config
    }

    #[test]
    fn minimal_config_fills_defaults() {
        let config = parse(
            r#"
            [[targets]]
            name = "root"
            probe = "disk"
            path = "/"
            "#,
        );
        config.validate().expect("minimal config should validate");
        assert_eq!(config.interval_secs, 60);
        assert_eq!(config.acquire_timeout_ms, 5_000);
        assert_eq!(config.delivery.max_retries, 1);
        assert!(matches!(config.reporters[0], ReporterSpec::Console));
        match &config.targets[0].probe {
            ProbeSpec::Disk {
                warn_pct, crit_pct, ..
            } => {
                assert!((warn_pct - 80.0).abs() < f64::EPSILON);
                assert!((crit_pct - 90.0).abs() < f64::EPSILON);
            }
            other => panic!("expected disk probe, got {other:?}"),
        }
    }

    #[test]
    fn empty_target_set_is_rejected() {
        let config = parse("interval_secs = 10");
        let err = config.validate().expect_err("must reject empty targets");
        assert_eq!(err.code(), "VGL-1001");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = parse(
            r#"
            interval_secs = 0
            [[targets]]
            name = "mem"
            probe = "memory"
            "#,
        );
        let err = config.validate().expect_err("must reject zero interval");
        assert!(err.to_string().contains("interval_secs"));
    }

    #[test]
    fn duplicate_target_names_are_rejected() {
        let config = parse(
            r#"
            [[targets]]
            name = "mem"
            probe = "memory"
            [[targets]]
            name = "mem"
            probe = "memory"
            "#,
        );
        let err = config.validate().expect_err("must reject duplicates");
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = parse(
            r#"
            [[targets]]
            name = "root"
            probe = "disk"
            path = "/"
            warn_pct = 95.0
            crit_pct = 90.0
            "#,
        );
        let err = config.validate().expect_err("must reject warn > crit");
        assert!(err.to_string().contains("warn threshold"));
    }

    #[test]
    fn non_finite_thresholds_are_rejected() {
        for literal in ["nan", "inf", "-inf"] {
            let config = parse(&format!(
                r#"
                [[targets]]
                name = "root"
                probe = "disk"
                path = "/"
                warn_pct = {literal}
                "#
            ));
            let err = config
                .validate()
                .expect_err("non-finite threshold must be rejected");
            assert!(err.to_string().contains("finite"), "literal {literal}");
        }
    }

    #[test]
    fn file_probe_and_jsonl_reporter_round_trip() {
        let config = parse(
            r#"
            max_cycles = 3
            [[targets]]
            name = "heartbeat"
            probe = "file"
            path = "/var/run/heartbeat"
            warn_age_secs = 120
            crit_age_secs = 600
            [[reporters]]
            kind = "jsonl"
            path = "/tmp/reports.jsonl"
            "#,
        );
        config.validate().expect("config should validate");
        assert_eq!(config.max_cycles, Some(3));
        let rendered = config.to_toml().expect("render should succeed");
        let reparsed: MonitorConfig = toml::from_str(&rendered).expect("round trip");
        assert_eq!(reparsed.targets[0].name, "heartbeat");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = MonitorConfig::load(Path::new("/nonexistent/vigil.toml"))
            .expect_err("missing file must fail");
        assert_eq!(err.code(), "VGL-1002");
    }

    #[test]
    fn load_parses_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            "[[targets]]\nname = \"mem\"\nprobe = \"memory\"\n"
        )
        .expect("write");
        let config = MonitorConfig::load(file.path()).expect("load should succeed");
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn builtin_default_validates() {
        MonitorConfig::builtin_default()
            .validate()
            .expect("builtin default must always validate");
    }
}
