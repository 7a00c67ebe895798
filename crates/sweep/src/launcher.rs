//! Launcher seam to the external benchmark runner.

use anyhow::{bail, Context, Result};
use llmperf_config::experiment::EXPERIMENT_CONFIG_FILE;
use llmperf_config::ExperimentConfig;
use llmperf_report::{BenchmarkReport, BENCHMARK_REPORT_FILE};
use std::path::PathBuf;
use std::process::Command;
use std::time::Instant;
use tracing::info;

/// Runs one experiment and returns its report.
pub trait Launcher {
    /// Name of this launcher.
    fn name(&self) -> &str;

    fn launch(&self, config: &ExperimentConfig) -> Result<BenchmarkReport>;
}

/// Runs the external runner as a child process per experiment.
///
/// The child is started as `<program> [args...] <config path>` inside
/// `<run_dir>/<subfolder>/` and must leave a `benchmark_report.json` there.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    run_dir: PathBuf,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<String>, args: Vec<String>, run_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            run_dir: run_dir.into(),
        }
    }
}

/// Keep the tail of a child's stderr for error messages.
fn stderr_tail(stderr: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

impl Launcher for ProcessLauncher {
    fn name(&self) -> &str {
        "process"
    }

    fn launch(&self, config: &ExperimentConfig) -> Result<BenchmarkReport> {
        let workdir = self.run_dir.join(config.subfolder());
        let config_path = workdir.join(EXPERIMENT_CONFIG_FILE);
        let report_path = workdir.join(BENCHMARK_REPORT_FILE);
        config.save(&config_path)?;
        if report_path.exists() {
            std::fs::remove_file(&report_path)?;
        }

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(&config_path)
            .current_dir(&workdir);
        if config.launcher.device_isolation && config.backend.device == "cuda" {
            command.env("CUDA_VISIBLE_DEVICES", &config.backend.device_ids);
        }

        info!(
            experiment = %config.experiment_name,
            model = %config.backend.model,
            program = %self.program,
            workdir = %workdir.display(),
            "launching experiment"
        );
        let start = Instant::now();
        let output = command
            .output()
            .with_context(|| format!("failed to start runner {}", self.program))?;

        if !output.status.success() {
            bail!(
                "runner exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr, 40)
            );
        }

        let report = BenchmarkReport::load(&report_path).with_context(|| {
            format!("runner did not produce {}", report_path.display())
        })?;
        info!(
            experiment = %config.experiment_name,
            elapsed_s = start.elapsed().as_secs_f64(),
            "experiment finished"
        );
        Ok(report)
    }
}
