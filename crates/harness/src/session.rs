//! Sweep session orchestration: settings, store and launcher wiring.

use anyhow::{bail, Result};
use llmperf_config::SweepSettings;
use llmperf_sweep::{
    Combination, HubStore, Launcher, LocalStore, ProcessLauncher, ResultStore, SkipReason,
    SweepPlan, SweepRunner, SweepSummary,
};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Local,
    Hub,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Local => write!(f, "local"),
            StoreKind::Hub => write!(f, "hub"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(StoreKind::Local),
            "hub" => Ok(StoreKind::Hub),
            other => Err(format!("Unknown store: {} (expected local or hub)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub store: StoreKind,
    /// Root of the local store.
    pub store_dir: PathBuf,
    pub launcher_program: String,
    pub launcher_args: Vec<String>,
    pub run_dir: PathBuf,
    pub private: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            store: StoreKind::Local,
            store_dir: PathBuf::from("results"),
            launcher_program: "optimum-benchmark".into(),
            launcher_args: Vec::new(),
            run_dir: PathBuf::from("runs"),
            private: true,
        }
    }
}

impl SessionOptions {
    pub fn build_store(&self) -> Box<dyn ResultStore> {
        match self.store {
            StoreKind::Local => Box::new(LocalStore::new(self.store_dir.clone())),
            StoreKind::Hub => {
                let hub = HubStore::from_env();
                if !hub.is_authenticated() {
                    warn!("HF_TOKEN is not set; pushes to the hub will be rejected");
                }
                Box::new(hub)
            }
        }
    }

    pub fn build_launcher(&self) -> Box<dyn Launcher> {
        Box::new(ProcessLauncher::new(
            self.launcher_program.clone(),
            self.launcher_args.clone(),
            self.run_dir.clone(),
        ))
    }
}

pub struct SweepSession {
    settings: SweepSettings,
    plan: SweepPlan,
    runner: SweepRunner,
}

impl SweepSession {
    pub fn new(settings: SweepSettings, options: &SessionOptions) -> Result<Self> {
        if options.launcher_program.trim().is_empty() {
            bail!("launcher program must not be empty");
        }
        let session = Self::with_components(
            settings,
            options.build_launcher(),
            options.build_store(),
        )?;
        Ok(Self {
            runner: session.runner.with_private(options.private),
            ..session
        })
    }

    /// Wire a session around caller-provided seams.
    pub fn with_components(
        settings: SweepSettings,
        launcher: Box<dyn Launcher>,
        store: Box<dyn ResultStore>,
    ) -> Result<Self> {
        let plan = SweepPlan::from_settings(&settings);
        let runner = SweepRunner::new(launcher, store, settings.push_repo_id())?;
        info!(
            machine = %settings.machine,
            subset = %settings.subset,
            canonical_models_only = settings.canonical_models_only,
            combinations = plan.len(),
            "sweep session ready"
        );
        Ok(Self {
            settings,
            plan,
            runner,
        })
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    pub fn plan(&self) -> &SweepPlan {
        &self.plan
    }

    pub fn repo_id(&self) -> &str {
        self.runner.repo_id()
    }

    /// Each combination with the reason it would be skipped, if any.
    pub fn preview(&self) -> Vec<(&Combination, Option<SkipReason>)> {
        self.plan
            .combinations()
            .iter()
            .map(|combination| (combination, self.runner.skip_reason(combination)))
            .collect()
    }

    pub fn run(&self) -> SweepSummary {
        self.runner.run(&self.plan)
    }
}
