//! Top-level CLI definition and dispatch.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;

use crate::core::config::MonitorConfig;
use crate::core::errors::Result;
use crate::core::observation::Status;
use crate::engine::Runner;
use crate::logger::{Diag, Level};

/// vigil — observe-evaluate-report monitoring daemon.
#[derive(Parser)]
#[command(name = "vigil", version, about)]
pub struct Cli {
    /// Path to a TOML configuration file. Falls back to ./vigil.toml, then
    /// the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug diagnostics on stderr.
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Run the monitor loop in the foreground until cancelled.
    Run {
        /// Stop after this many cycles (overrides the configured budget).
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Perform a single cycle and print the report to the console.
    Check,
    /// Show or validate configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: Shell,
    },
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Validate the configuration and exit.
    Validate,
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<()> {
    let diag = if cli.verbose {
        Diag::new(Level::Debug)
    } else {
        Diag::default()
    };
    match &cli.command {
        Command::Run { cycles } => run_loop(cli, *cycles, &diag),
        Command::Check => run_check(cli),
        Command::Config { action } => run_config(cli, action),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "vigil", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<MonitorConfig> {
    MonitorConfig::load_or_default(cli.config.as_deref())
}

fn run_loop(cli: &Cli, cycles: Option<u64>, diag: &Diag) -> Result<()> {
    let mut config = load_config(cli)?;
    if cycles.is_some() {
        config.max_cycles = cycles;
    }
    let mut runner = Runner::from_config(&config)?;
    let cancel = cancel_flag()?;
    let summary = runner.run(&cancel, diag)?;
    diag.info(format!("stopped after {} cycle(s)", summary.cycles));
    Ok(())
}

fn run_check(cli: &Cli) -> Result<()> {
    let mut config = load_config(cli)?;
    // One cycle straight to the console, whatever sinks are configured.
    config.reporters = vec![crate::core::config::ReporterSpec::Console];
    let mut runner = Runner::from_config(&config)?;
    let report = runner.run_cycle()?;
    let label = report.worst_status().label();
    let colored_label = match report.worst_status() {
        Status::Ok => label.green(),
        Status::Warning => label.yellow(),
        Status::Critical => label.red().bold(),
        Status::Unknown => label.magenta(),
    };
    println!("overall: {colored_label}");
    Ok(())
}

fn run_config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let config = load_config(cli)?;
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Validate => {
            config.validate()?;
            println!(
                "{} {} target(s), {} reporter(s)",
                "configuration valid:".green(),
                config.targets.len(),
                config.reporters.len()
            );
        }
    }
    Ok(())
}

#[cfg(feature = "daemon")]
fn cancel_flag() -> Result<Arc<AtomicBool>> {
    crate::daemon::install_cancel_flag()
}

#[cfg(not(feature = "daemon"))]
fn cancel_flag() -> Result<Arc<AtomicBool>> {
    Ok(Arc::new(AtomicBool::new(false)))
}
