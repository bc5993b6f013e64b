//! End-to-end monitor loop tests against the public library API: real
//! file probes, a real JSONL sink, and cooperative cancellation.

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use vigil::core::config::MonitorConfig;
use vigil::core::errors::Result;
use vigil::core::observation::{Report, Sample, Status};
use vigil::engine::{Runner, StopReason, Target};
use vigil::logger::Diag;
use vigil::report::Reporter;
use vigil::source::ObservationSource;

#[test]
fn file_probe_reports_land_in_jsonl_sink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let heartbeat = dir.path().join("heartbeat");
    let mut file = std::fs::File::create(&heartbeat).expect("heartbeat file");
    writeln!(file, "beat").expect("write heartbeat");
    let sink = dir.path().join("reports.jsonl");

    let raw = format!(
        r#"
        interval_secs = 1
        max_cycles = 2
        [[targets]]
        name = "heartbeat"
        probe = "file"
        path = "{heartbeat}"
        warn_age_secs = 3600
        crit_age_secs = 7200
        [[targets]]
        name = "missing"
        probe = "file"
        path = "{missing}"
        warn_age_secs = 3600
        crit_age_secs = 7200
        [[reporters]]
        kind = "jsonl"
        path = "{sink}"
        "#,
        heartbeat = heartbeat.display(),
        missing = dir.path().join("never-written").display(),
        sink = sink.display(),
    );
    let config: MonitorConfig = toml::from_str(&raw).expect("config parses");
    config.validate().expect("config validates");

    let mut runner = Runner::from_config(&config).expect("runner builds");
    let cancel = AtomicBool::new(false);
    let summary = runner
        .run(&cancel, &Diag::quiet())
        .expect("finite run completes");
    assert_eq!(summary.cycles, 2);
    assert_eq!(summary.reason, StopReason::CyclesExhausted);

    let raw = std::fs::read_to_string(&sink).expect("sink readable");
    let reports: Vec<Report> = raw
        .lines()
        .map(|line| serde_json::from_str(line).expect("line parses"))
        .collect();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.observations.len(), 2);
        assert_eq!(report.observations[0].target, "heartbeat");
        assert_eq!(report.observations[0].status, Status::Ok);
        assert_eq!(report.observations[1].target, "missing");
        assert_eq!(report.observations[1].status, Status::Unknown);
    }
    assert_eq!(reports[0].cycle, 1);
    assert_eq!(reports[1].cycle, 2);
}

struct SteadySource;

impl ObservationSource for SteadySource {
    fn kind(&self) -> &'static str {
        "steady"
    }
    fn fetch(&self) -> Result<Sample> {
        Ok(Sample {
            value: 1.0,
            unit: "pct",
            detail: "steady".to_string(),
        })
    }
}

struct NullSink;

impl Reporter for NullSink {
    fn name(&self) -> &'static str {
        "null"
    }
    fn deliver(&self, _report: &Report) -> Result<()> {
        Ok(())
    }
}

#[test]
fn signal_style_cancellation_stops_an_unbounded_run() {
    let mut config = MonitorConfig::builtin_default();
    config.interval_secs = 1;
    let targets = vec![Target {
        name: "steady".to_string(),
        source: Arc::new(SteadySource),
        thresholds: vigil::core::config::Thresholds {
            warn: 80.0,
            crit: 90.0,
        },
    }];
    let mut runner = Runner::assemble(&config, targets, vec![Box::new(NullSink)]);

    let cancel = Arc::new(AtomicBool::new(false));
    let handle = {
        let cancel = Arc::clone(&cancel);
        std::thread::spawn(move || runner.run(&cancel, &Diag::quiet()))
    };
    std::thread::sleep(Duration::from_millis(300));
    cancel.store(true, Ordering::Relaxed);
    let summary = handle
        .join()
        .expect("runner thread joins")
        .expect("cancelled run is clean");
    assert_eq!(summary.reason, StopReason::Cancelled);
    assert!(summary.cycles >= 1, "first cycle should have run");
}
