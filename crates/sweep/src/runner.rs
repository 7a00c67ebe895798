//! Sweep runner: one pass over a plan, no retries.

use crate::errors::{report_failure, FailureKind};
use crate::launcher::Launcher;
use crate::plan::{Combination, SweepPlan};
use crate::skip::{is_experiment_conducted, is_experiment_not_supported, SkipReason};
use crate::store::ResultStore;
use anyhow::{anyhow, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Skipped(SkipReason),
    Succeeded,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepSummary {
    pub total: usize,
    pub skipped_unsupported: usize,
    pub skipped_conducted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl SweepSummary {
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Skipped(SkipReason::Unsupported) => self.skipped_unsupported += 1,
            Outcome::Skipped(SkipReason::AlreadyConducted) => self.skipped_conducted += 1,
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }
}

pub struct SweepRunner {
    launcher: Box<dyn Launcher>,
    store: Box<dyn ResultStore>,
    repo_id: String,
    private: bool,
    cwd: PathBuf,
}

impl SweepRunner {
    /// Captures the current working directory, restored after each failure.
    pub fn new(
        launcher: Box<dyn Launcher>,
        store: Box<dyn ResultStore>,
        repo_id: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            launcher,
            store,
            repo_id: repo_id.into(),
            private: true,
            cwd: std::env::current_dir()?,
        })
    }

    pub fn with_private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    /// Why this combination would be skipped, if at all.
    pub fn skip_reason(&self, combination: &Combination) -> Option<SkipReason> {
        if is_experiment_not_supported(
            combination.weights.config.torch_dtype,
            combination.attn_implementation,
        ) {
            return Some(SkipReason::Unsupported);
        }
        let config = combination.experiment_config();
        if is_experiment_conducted(
            self.store.as_ref(),
            &config,
            &self.repo_id,
            &config.subfolder(),
        ) {
            return Some(SkipReason::AlreadyConducted);
        }
        None
    }

    pub fn run_combination(&self, combination: &Combination) -> Outcome {
        let model = combination.model.as_str();
        let experiment_name = combination.experiment_name();

        if is_experiment_not_supported(
            combination.weights.config.torch_dtype,
            combination.attn_implementation,
        ) {
            info!(model, "Skipping experiment since it is not supported");
            return Outcome::Skipped(SkipReason::Unsupported);
        }

        let config = combination.experiment_config();
        let subfolder = config.subfolder();
        if is_experiment_conducted(self.store.as_ref(), &config, &self.repo_id, &subfolder) {
            info!(
                experiment = %experiment_name,
                model,
                "Skipping experiment since it was already conducted"
            );
            return Outcome::Skipped(SkipReason::AlreadyConducted);
        }

        let attempt = || -> Result<()> {
            config.validate().map_err(|e| anyhow!(e))?;
            self.store
                .push_experiment_config(&config, &self.repo_id, &subfolder, self.private)?;
            let report = self.launcher.launch(&config)?;
            report.log();
            self.store
                .push_benchmark_report(&report, &self.repo_id, &subfolder, self.private)?;
            Ok(())
        };

        match attempt() {
            Ok(()) => Outcome::Succeeded,
            Err(err) => {
                // launchers may leave the process in their run directory
                if let Err(e) = std::env::set_current_dir(&self.cwd) {
                    warn!(cwd = %self.cwd.display(), error = %e, "failed to restore working directory");
                }
                error!(experiment = %experiment_name, model, "Experiment failed");
                let kind = report_failure(&err, self.store.as_ref(), &self.repo_id, &subfolder);
                Outcome::Failed(kind)
            }
        }
    }

    pub fn run(&self, plan: &SweepPlan) -> SweepSummary {
        info!(
            combinations = plan.len(),
            launcher = self.launcher.name(),
            store = self.store.name(),
            repo_id = %self.repo_id,
            "starting sweep"
        );

        let mut summary = SweepSummary::default();
        for combination in plan.combinations() {
            summary.record(self.run_combination(combination));
        }

        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped_unsupported = summary.skipped_unsupported,
            skipped_conducted = summary.skipped_conducted,
            "sweep finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use llmperf_config::{AttnImplementation, ExperimentConfig, Subset};
    use llmperf_report::{BenchmarkReport, Throughput};
    use std::cell::RefCell;
    use std::rc::Rc;

    const REPO: &str = "org/results";

    /// Succeeds unless the model name says otherwise.
    struct FakeLauncher {
        launched: Rc<RefCell<Vec<String>>>,
    }

    impl Launcher for FakeLauncher {
        fn name(&self) -> &str {
            "fake"
        }

        fn launch(&self, config: &ExperimentConfig) -> Result<BenchmarkReport> {
            self.launched.borrow_mut().push(config.subfolder());
            match config.backend.model.as_str() {
                "org/oom" => Err(anyhow!("torch.cuda.OutOfMemoryError: CUDA out of memory")),
                "org/broken" => Err(anyhow!("segmentation fault")),
                _ => {
                    let mut report = BenchmarkReport::empty_text_generation();
                    report.targets.get_mut("decode").unwrap().throughput = Some(Throughput {
                        unit: "tokens/s".into(),
                        value: 10.0,
                    });
                    Ok(report)
                }
            }
        }
    }

    fn runner(root: &std::path::Path) -> (SweepRunner, Rc<RefCell<Vec<String>>>) {
        let launched = Rc::new(RefCell::new(Vec::new()));
        let launcher = FakeLauncher {
            launched: Rc::clone(&launched),
        };
        let runner = SweepRunner::new(
            Box::new(launcher),
            Box::new(LocalStore::new(root)),
            REPO,
        )
        .unwrap();
        (runner, launched)
    }

    #[test]
    fn test_sweep_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, launched) = runner(dir.path());
        let plan = SweepPlan::new(
            &["org/ok", "org/oom", "org/broken"],
            &AttnImplementation::ALL,
            &Subset::Unquantized.weights_configs(),
        );

        let summary = runner.run(&plan);
        assert_eq!(summary.total, 27);
        // flash_attention_2 + float32, once per model
        assert_eq!(summary.skipped_unsupported, 3);
        assert_eq!(summary.succeeded, 8);
        assert_eq!(summary.failed, 16);
        assert_eq!(launched.borrow().len(), 24);
    }

    #[test]
    fn test_second_sweep_skips_conducted_and_known_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, launched) = runner(dir.path());
        let plan = SweepPlan::new(
            &["org/ok", "org/oom", "org/broken"],
            &[AttnImplementation::Sdpa],
            &Subset::Bnb.weights_configs(),
        );

        let first = runner.run(&plan);
        assert_eq!(first.succeeded, 2);
        assert_eq!(first.failed, 4);

        launched.borrow_mut().clear();
        let second = runner.run(&plan);
        // successes and OOM placeholders are recorded; unknown failures are retried
        assert_eq!(second.skipped_conducted, 4);
        assert_eq!(second.failed, 2);
        assert!(launched.borrow().iter().all(|s| s.ends_with("org--broken")));
    }

    #[test]
    fn test_failure_outcome_kind() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, _) = runner(dir.path());
        let plan = SweepPlan::new(
            &["org/oom"],
            &[AttnImplementation::Eager],
            &Subset::Unquantized.weights_configs()[..1],
        );
        let outcome = runner.run_combination(&plan.combinations()[0]);
        assert_eq!(outcome, Outcome::Failed(FailureKind::CudaOutOfMemory));
    }

    #[test]
    fn test_skip_reason_preview() {
        let dir = tempfile::tempdir().unwrap();
        let (runner, launched) = runner(dir.path());
        let plan = SweepPlan::new(
            &["org/ok"],
            &[AttnImplementation::FlashAttention2],
            &Subset::Unquantized.weights_configs(),
        );
        let combos = plan.combinations();
        assert_eq!(runner.skip_reason(&combos[0]), Some(SkipReason::Unsupported));
        assert_eq!(runner.skip_reason(&combos[1]), None);

        runner.run_combination(&combos[1]);
        assert_eq!(runner.skip_reason(&combos[1]), Some(SkipReason::AlreadyConducted));
        assert_eq!(launched.borrow().len(), 1);
    }
}
