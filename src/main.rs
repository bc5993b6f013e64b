//! Binary entry point for the `vigil` CLI.

use clap::Parser;
use colored::Colorize;

use vigil::cli_app::{Cli, run};

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{} {err}", "error:".red().bold());
        std::process::exit(1);
    }
}
