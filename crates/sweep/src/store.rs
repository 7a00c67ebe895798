//! Result storage keyed by repository id and subfolder.

use anyhow::{Context, Result};
use llmperf_config::experiment::EXPERIMENT_CONFIG_FILE;
use llmperf_config::ExperimentConfig;
use llmperf_report::{BenchmarkReport, BENCHMARK_REPORT_FILE};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage for experiment configurations and benchmark reports.
///
/// Implementors only move file contents; the provided methods handle the
/// config/report file names and (de)serialization.
pub trait ResultStore {
    /// Name of this store, for logging.
    fn name(&self) -> &str;

    /// Read `<subfolder>/<file>` from a repository, `None` if absent.
    fn read_file(&self, repo_id: &str, path: &str) -> Result<Option<String>>;

    /// Create or overwrite `<subfolder>/<file>` in a repository.
    fn write_file(&self, repo_id: &str, path: &str, contents: &str, private: bool) -> Result<()>;

    /// Stored experiment configuration as a raw JSON value.
    fn load_experiment_config(&self, repo_id: &str, subfolder: &str) -> Result<Option<Value>> {
        let path = format!("{}/{}", subfolder, EXPERIMENT_CONFIG_FILE);
        match self.read_file(repo_id, &path)? {
            Some(json) => Ok(Some(
                serde_json::from_str(&json).with_context(|| format!("malformed {}", path))?,
            )),
            None => Ok(None),
        }
    }

    fn load_benchmark_report(
        &self,
        repo_id: &str,
        subfolder: &str,
    ) -> Result<Option<BenchmarkReport>> {
        let path = format!("{}/{}", subfolder, BENCHMARK_REPORT_FILE);
        match self.read_file(repo_id, &path)? {
            Some(json) => Ok(Some(
                BenchmarkReport::from_json(&json).with_context(|| format!("malformed {}", path))?,
            )),
            None => Ok(None),
        }
    }

    /// A report exists and parses.
    fn has_benchmark_report(&self, repo_id: &str, subfolder: &str) -> Result<bool> {
        Ok(self.load_benchmark_report(repo_id, subfolder)?.is_some())
    }

    fn push_experiment_config(
        &self,
        config: &ExperimentConfig,
        repo_id: &str,
        subfolder: &str,
        private: bool,
    ) -> Result<()> {
        let path = format!("{}/{}", subfolder, EXPERIMENT_CONFIG_FILE);
        self.write_file(repo_id, &path, &config.to_json()?, private)
    }

    fn push_benchmark_report(
        &self,
        report: &BenchmarkReport,
        repo_id: &str,
        subfolder: &str,
        private: bool,
    ) -> Result<()> {
        let path = format!("{}/{}", subfolder, BENCHMARK_REPORT_FILE);
        self.write_file(repo_id, &path, &report.to_json()?, private)
    }
}

/// Filesystem store mirroring the hub layout: `<root>/<repo_id>/<subfolder>/<file>`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, repo_id: &str, path: &str) -> PathBuf {
        self.root.join(repo_id).join(path)
    }
}

impl ResultStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    fn read_file(&self, repo_id: &str, path: &str) -> Result<Option<String>> {
        let full = self.path_of(repo_id, path);
        if !full.exists() {
            return Ok(None);
        }
        let contents =
            fs::read_to_string(&full).with_context(|| format!("failed to read {}", full.display()))?;
        Ok(Some(contents))
    }

    fn write_file(&self, repo_id: &str, path: &str, contents: &str, private: bool) -> Result<()> {
        let full = self.path_of(repo_id, path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&full, contents).with_context(|| format!("failed to write {}", full.display()))?;
        debug!(path = %full.display(), private, "stored file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmperf_config::{AttnImplementation, Subset};

    #[test]
    fn test_local_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let weights = Subset::Unquantized.weights_configs().remove(1);
        let config =
            ExperimentConfig::for_combination("facebook/opt-125m", AttnImplementation::Eager, &weights);
        let subfolder = config.subfolder();

        assert!(store.load_experiment_config("org/repo", &subfolder).unwrap().is_none());
        store
            .push_experiment_config(&config, "org/repo", &subfolder, true)
            .unwrap();
        let stored = store.load_experiment_config("org/repo", &subfolder).unwrap().unwrap();
        assert_eq!(stored, serde_json::to_value(&config).unwrap());

        assert!(dir
            .path()
            .join("org/repo/float16-eager/facebook--opt-125m/experiment_config.json")
            .exists());

        let report = BenchmarkReport::empty_text_generation();
        store
            .push_benchmark_report(&report, "org/repo", &subfolder, true)
            .unwrap();
        assert_eq!(
            store.load_benchmark_report("org/repo", &subfolder).unwrap(),
            Some(report)
        );
    }

    #[test]
    fn test_malformed_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        store
            .write_file("org/repo", "exp/model/experiment_config.json", "{", false)
            .unwrap();
        assert!(store.load_experiment_config("org/repo", "exp/model").is_err());
    }
}
