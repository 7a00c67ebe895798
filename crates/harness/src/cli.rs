//! CLI wiring for llm-perf.

use crate::pipeline::{PlotConfig, PlotPipeline};
use crate::session::{SessionOptions, StoreKind, SweepSession};
use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use llmperf_config::{Subset, SweepSettings};
use llmperf_sweep::{is_experiment_not_supported, SkipReason, SweepPlan};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "llm-perf", about = "LLM inference benchmark sweeps and plots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Selection flags; unset flags fall back to MACHINE, SUBSET and CANONICAL_MODELS_ONLY.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    #[arg(long)]
    pub machine: Option<String>,
    #[arg(long)]
    pub subset: Option<Subset>,
    /// Sweep every pretrained model instead of the canonical list.
    #[arg(long, default_value_t = false)]
    pub all_models: bool,
}

impl SelectionArgs {
    pub fn resolve(&self) -> Result<SweepSettings> {
        let mut settings = SweepSettings::from_env().map_err(|e| anyhow!(e))?;
        if let Some(machine) = &self.machine {
            settings.machine = machine.clone();
        }
        if let Some(subset) = self.subset {
            settings.subset = subset;
        }
        if self.all_models {
            settings.canonical_models_only = false;
        }
        Ok(settings)
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
pub enum StoreArg {
    Local,
    Hub,
}

impl From<StoreArg> for StoreKind {
    fn from(value: StoreArg) -> StoreKind {
        match value {
            StoreArg::Local => StoreKind::Local,
            StoreArg::Hub => StoreKind::Hub,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate experiment results in DIR and write per-batch-size charts.
    Plot {
        dir: PathBuf,
        #[arg(long, default_value = "plots")]
        output_dir: PathBuf,
    },
    /// Run the benchmark sweep for the selected subset and models.
    Sweep {
        #[command(flatten)]
        selection: SelectionArgs,
        #[arg(long, value_enum, default_value = "local")]
        store: StoreArg,
        #[arg(long, default_value = "results")]
        store_dir: PathBuf,
        #[arg(long, default_value = "optimum-benchmark")]
        launcher_program: String,
        #[arg(long = "launcher-arg", allow_hyphen_values = true)]
        launcher_args: Vec<String>,
        #[arg(long, default_value = "runs")]
        run_dir: PathBuf,
        /// List what would run without launching anything.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Print the enumerated combinations.
    Plan {
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

pub fn run_cli(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .init();

    match cli.command {
        Command::Plot { dir, output_dir } => {
            let pipeline = PlotPipeline::new(PlotConfig { output_dir });
            let artifacts = pipeline.run(&dir)?;
            println!(
                "experiments={}, charts={}, output_dir={}",
                artifacts.metrics.len(),
                artifacts.charts.len(),
                pipeline.config().output_dir.display()
            );
            for path in &artifacts.charts {
                println!("- {}", path.display());
            }
        }
        Command::Sweep {
            selection,
            store,
            store_dir,
            launcher_program,
            launcher_args,
            run_dir,
            dry_run,
        } => {
            let settings = selection.resolve()?;
            let options = SessionOptions {
                store: store.into(),
                store_dir,
                launcher_program,
                launcher_args,
                run_dir,
                ..SessionOptions::default()
            };
            let session = SweepSession::new(settings, &options)?;
            println!("Total number of experiments: {}", session.plan().len());

            if dry_run {
                let preview = session.preview();
                let pending = preview.iter().filter(|(_, reason)| reason.is_none()).count();
                for (combination, reason) in &preview {
                    println!("{:<14} {}", status(*reason), combination.subfolder());
                }
                println!("pending={} repo_id={}", pending, session.repo_id());
                return Ok(());
            }

            let summary = session.run();
            println!(
                "total={} succeeded={} failed={} skipped_unsupported={} skipped_conducted={}",
                summary.total,
                summary.succeeded,
                summary.failed,
                summary.skipped_unsupported,
                summary.skipped_conducted
            );
        }
        Command::Plan { selection } => {
            let settings = selection.resolve()?;
            let plan = SweepPlan::from_settings(&settings);
            info!(repo_id = %settings.push_repo_id(), "enumerated sweep plan");
            println!("Total number of experiments: {}", plan.len());
            for combination in plan.combinations() {
                let unsupported = is_experiment_not_supported(
                    combination.weights.config.torch_dtype,
                    combination.attn_implementation,
                );
                let reason = unsupported.then_some(SkipReason::Unsupported);
                println!("{:<14} {}", status(reason), combination.subfolder());
            }
        }
    }
    Ok(())
}

fn status(reason: Option<SkipReason>) -> &'static str {
    match reason {
        None => "run",
        Some(SkipReason::Unsupported) => "unsupported",
        Some(SkipReason::AlreadyConducted) => "conducted",
    }
}
