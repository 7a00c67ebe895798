//! Aggregate-then-plot pipeline.

use anyhow::Result;
use llmperf_plot::{render_all, DEFAULT_PLOTS_DIR};
use llmperf_report::AggregatedMetrics;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub output_dir: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_PLOTS_DIR),
        }
    }
}

#[derive(Debug)]
pub struct PlotArtifacts {
    pub metrics: AggregatedMetrics,
    pub charts: Vec<PathBuf>,
}

pub struct PlotPipeline {
    config: PlotConfig,
}

impl PlotPipeline {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, experiments_dir: &Path) -> Result<PlotArtifacts> {
        let metrics = AggregatedMetrics::collect(experiments_dir)?;
        info!(
            output_dir = %self.config.output_dir.display(),
            experiments = metrics.len(),
            "rendering charts"
        );

        let charts = render_all(&metrics, &self.config.output_dir)?;
        Ok(PlotArtifacts { metrics, charts })
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_experiment_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PlotPipeline::new(PlotConfig {
            output_dir: dir.path().join("plots"),
        });
        assert!(pipeline.run(&dir.path().join("absent")).is_err());
    }

    #[test]
    fn test_empty_experiment_dir_still_plots() {
        let dir = tempfile::tempdir().unwrap();
        let experiments = dir.path().join("experiments");
        std::fs::create_dir(&experiments).unwrap();
        let pipeline = PlotPipeline::new(PlotConfig {
            output_dir: dir.path().join("plots"),
        });
        let artifacts = pipeline.run(&experiments).unwrap();
        assert!(artifacts.metrics.is_empty());
        assert!(pipeline.config().output_dir.is_dir());
    }
}
