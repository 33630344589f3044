//! Command-line entry point for the coherence checker.

use std::process::ExitCode;

use clap::Parser;

mod cli;
use cli::Cli;

fn main() -> anyhow::Result<ExitCode> {
    Cli::parse().run()
}
