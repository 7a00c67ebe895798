//! llm-perf command line executable.

use anyhow::Result;
use clap::Parser;
use llmperf_harness::cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
