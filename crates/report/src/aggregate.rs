//! Aggregation of experiment outputs for plotting.
//!
//! An experiment directory holds an `experiment_config.json` and a
//! `benchmark_report.json`. From each pair we extract the batch size and six
//! first-row metrics; unusable experiments are logged and dropped.

use crate::report::BENCHMARK_REPORT_FILE;
use anyhow::{bail, Context, Result};
use llmperf_config::experiment::EXPERIMENT_CONFIG_FILE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing expected key: {0}")]
    MissingKey(String),

    #[error("value at {0} is not numeric")]
    NotNumeric(String),
}

/// First-row metrics of one experiment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetrics {
    pub batch_size: u64,
    pub prefill_mean_latency: f64,
    pub decode_mean_latency: f64,
    pub prefill_max_ram: f64,
    pub decode_max_ram: f64,
    pub decode_throughput: f64,
    pub prefill_throughput: f64,
}

impl ExperimentMetrics {
    /// Extract metrics from a parsed configuration and report.
    pub fn extract(config: &Value, report: &Value) -> Result<Self, MetricsError> {
        Ok(Self {
            batch_size: batch_size(config)?,
            prefill_mean_latency: measurement(report, "prefill", "latency", "mean")?,
            decode_mean_latency: measurement(report, "decode", "latency", "mean")?,
            prefill_max_ram: measurement(report, "prefill", "memory", "max_ram")?,
            decode_max_ram: measurement(report, "decode", "memory", "max_ram")?,
            decode_throughput: measurement(report, "decode", "throughput", "value")?,
            prefill_throughput: measurement(report, "prefill", "throughput", "value")?,
        })
    }

    pub fn try_load(config_path: &Path, report_path: &Path) -> Result<Self, MetricsError> {
        let config = read_json(config_path)?;
        let report = read_json(report_path)?;
        Self::extract(&config, &report)
    }
}

/// Load one experiment, or `None` if any file, key or value is unusable.
pub fn load_experiment(config_path: &Path, report_path: &Path) -> Option<ExperimentMetrics> {
    match ExperimentMetrics::try_load(config_path, report_path) {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(
                config = %config_path.display(),
                error = %e,
                "dropping experiment with unusable outputs"
            );
            None
        }
    }
}

fn read_json(path: &Path) -> Result<Value, MetricsError> {
    let text = fs::read_to_string(path).map_err(|source| MetricsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| MetricsError::Json {
        path: path.display().to_string(),
        source,
    })
}

/// First element when the value holds a list of rows.
fn first_row(value: &Value) -> &Value {
    match value {
        Value::Array(rows) => rows.first().unwrap_or(&Value::Null),
        other => other,
    }
}

fn as_f64(value: &Value, path: &str) -> Result<f64, MetricsError> {
    first_row(value)
        .as_f64()
        .ok_or_else(|| MetricsError::NotNumeric(path.to_string()))
}

fn measurement(report: &Value, target: &str, kind: &str, field: &str) -> Result<f64, MetricsError> {
    let path = format!("{}.{}.{}", target, kind, field);
    let value = report
        .get(target)
        .and_then(|t| first_row(t).get(kind))
        .and_then(|m| first_row(m).get(field))
        .ok_or_else(|| MetricsError::MissingKey(path.clone()))?;
    as_f64(value, &path)
}

/// Flatten nested objects into dotted keys, depth first.
fn flatten<'a>(prefix: &str, value: &'a Value, out: &mut Vec<(String, &'a Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(&name, child, out);
            }
        }
        other => out.push((prefix.to_string(), other)),
    }
}

fn batch_size(config: &Value) -> Result<u64, MetricsError> {
    let benchmark = config
        .get("benchmark")
        .ok_or_else(|| MetricsError::MissingKey("benchmark".into()))?;

    let mut fields = Vec::new();
    flatten("benchmark", first_row(benchmark), &mut fields);

    let (path, value) = fields
        .into_iter()
        .filter(|(key, value)| key.rsplit('.').next() == Some("batch_size") && !value.is_null())
        .min_by_key(|(key, _)| key.as_str() != "benchmark.input_shapes.batch_size")
        .ok_or_else(|| MetricsError::MissingKey("benchmark.input_shapes.batch_size".into()))?;

    let value = first_row(value);
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                .map(|v| v as u64)
        })
        .ok_or(MetricsError::NotNumeric(path))
}

/// Metric columns available for plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    PrefillMeanLatency,
    DecodeMeanLatency,
    PrefillMaxRam,
    DecodeMaxRam,
    DecodeThroughput,
    PrefillThroughput,
}

/// Column-wise metrics across experiments; all columns share one length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedMetrics {
    pub experiments: Vec<String>,
    pub batch_sizes: Vec<u64>,
    pub prefill_mean_latencies: Vec<f64>,
    pub decode_mean_latencies: Vec<f64>,
    pub prefill_max_ram: Vec<f64>,
    pub decode_max_ram: Vec<f64>,
    pub decode_throughput: Vec<f64>,
    pub prefill_throughput: Vec<f64>,
}

impl AggregatedMetrics {
    /// Scan the immediate subdirectories of `dir` in name order.
    pub fn collect(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            bail!("experiment directory {} does not exist", dir.display());
        }

        let mut entries = fs::read_dir(dir)
            .with_context(|| format!("failed to list {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|entry| entry.file_name());

        let mut aggregated = Self::default();
        for entry in entries {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let config_path = path.join(EXPERIMENT_CONFIG_FILE);
            let report_path = path.join(BENCHMARK_REPORT_FILE);
            if !(config_path.exists() && report_path.exists()) {
                debug!(dir = %path.display(), "skipping directory without experiment outputs");
                continue;
            }

            if let Some(metrics) = load_experiment(&config_path, &report_path) {
                let name = entry.file_name().to_string_lossy().into_owned();
                aggregated.push(name, metrics);
            }
        }

        info!(
            dir = %dir.display(),
            experiments = aggregated.len(),
            "aggregated experiment metrics"
        );
        Ok(aggregated)
    }

    pub fn push(&mut self, experiment: impl Into<String>, metrics: ExperimentMetrics) {
        self.experiments.push(experiment.into());
        self.batch_sizes.push(metrics.batch_size);
        self.prefill_mean_latencies.push(metrics.prefill_mean_latency);
        self.decode_mean_latencies.push(metrics.decode_mean_latency);
        self.prefill_max_ram.push(metrics.prefill_max_ram);
        self.decode_max_ram.push(metrics.decode_max_ram);
        self.decode_throughput.push(metrics.decode_throughput);
        self.prefill_throughput.push(metrics.prefill_throughput);
    }

    pub fn len(&self) -> usize {
        self.batch_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_sizes.is_empty()
    }

    pub fn column(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::PrefillMeanLatency => &self.prefill_mean_latencies,
            Metric::DecodeMeanLatency => &self.decode_mean_latencies,
            Metric::PrefillMaxRam => &self.prefill_max_ram,
            Metric::DecodeMaxRam => &self.decode_max_ram,
            Metric::DecodeThroughput => &self.decode_throughput,
            Metric::PrefillThroughput => &self.prefill_throughput,
        }
    }

    /// (batch size, value) pairs for one metric.
    pub fn series(&self, metric: Metric) -> Vec<(u64, f64)> {
        self.batch_sizes
            .iter()
            .copied()
            .zip(self.column(metric).iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report() -> Value {
        json!({
            "prefill": {
                "memory": {"unit": "MB", "max_ram": 900.0},
                "latency": {"unit": "s", "mean": 0.05},
                "throughput": {"unit": "tokens/s", "value": 5120.0}
            },
            "decode": {
                "memory": {"unit": "MB", "max_ram": 950.0},
                "latency": {"unit": "s", "mean": 1.2},
                "throughput": {"unit": "tokens/s", "value": 52.5}
            }
        })
    }

    #[test]
    fn test_extract_first_row_metrics() {
        let config = json!({"benchmark": {"input_shapes": {"batch_size": 4, "sequence_length": 256}}});
        let metrics = ExperimentMetrics::extract(&config, &report()).unwrap();
        assert_eq!(metrics.batch_size, 4);
        assert_eq!(metrics.prefill_mean_latency, 0.05);
        assert_eq!(metrics.decode_mean_latency, 1.2);
        assert_eq!(metrics.prefill_max_ram, 900.0);
        assert_eq!(metrics.decode_max_ram, 950.0);
        assert_eq!(metrics.decode_throughput, 52.5);
        assert_eq!(metrics.prefill_throughput, 5120.0);
    }

    #[test]
    fn test_list_values_use_first_row() {
        let config = json!({"benchmark": {"input_shapes": {"batch_size": [2, 8]}}});
        let mut report = report();
        report["decode"]["latency"]["mean"] = json!([0.7, 0.9]);
        let metrics = ExperimentMetrics::extract(&config, &report).unwrap();
        assert_eq!(metrics.batch_size, 2);
        assert_eq!(metrics.decode_mean_latency, 0.7);
    }

    #[test]
    fn test_batch_size_found_outside_input_shapes() {
        let config = json!({"benchmark": {"shapes": {"batch_size": null}, "batch_size": 16.0}});
        let metrics = ExperimentMetrics::extract(&config, &report()).unwrap();
        assert_eq!(metrics.batch_size, 16);
    }

    #[test]
    fn test_missing_key() {
        let config = json!({"benchmark": {"input_shapes": {"batch_size": 1}}});
        let mut report = report();
        report["decode"].as_object_mut().unwrap().remove("throughput");
        let err = ExperimentMetrics::extract(&config, &report).unwrap_err();
        assert!(matches!(err, MetricsError::MissingKey(ref key) if key == "decode.throughput.value"));

        let err = ExperimentMetrics::extract(&json!({}), &self::report()).unwrap_err();
        assert!(matches!(err, MetricsError::MissingKey(_)));
    }

    #[test]
    fn test_non_numeric_value() {
        let config = json!({"benchmark": {"input_shapes": {"batch_size": 1}}});
        let mut report = report();
        report["prefill"]["memory"]["max_ram"] = json!("n/a");
        let err = ExperimentMetrics::extract(&config, &report).unwrap_err();
        assert!(matches!(err, MetricsError::NotNumeric(_)));

        let config = json!({"benchmark": {"input_shapes": {"batch_size": 1.5}}});
        assert!(ExperimentMetrics::extract(&config, &self::report()).is_err());
    }

    #[test]
    fn test_load_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(EXPERIMENT_CONFIG_FILE);
        let report_path = dir.path().join(BENCHMARK_REPORT_FILE);
        assert!(load_experiment(&config_path, &report_path).is_none());

        fs::write(&config_path, "{\"benchmark\": ").unwrap();
        fs::write(&report_path, report().to_string()).unwrap();
        assert!(matches!(
            ExperimentMetrics::try_load(&config_path, &report_path),
            Err(MetricsError::Json { .. })
        ));
        assert!(load_experiment(&config_path, &report_path).is_none());
    }

    #[test]
    fn test_series_pairs_batch_sizes() {
        let config = json!({"benchmark": {"input_shapes": {"batch_size": 2}}});
        let metrics = ExperimentMetrics::extract(&config, &report()).unwrap();
        let mut aggregated = AggregatedMetrics::default();
        aggregated.push("a", metrics);
        aggregated.push("b", ExperimentMetrics { batch_size: 8, ..metrics });
        assert_eq!(
            aggregated.series(Metric::DecodeThroughput),
            vec![(2, 52.5), (8, 52.5)]
        );
        assert_eq!(aggregated.len(), 2);
    }

    #[test]
    fn test_collect_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AggregatedMetrics::collect(dir.path().join("missing")).is_err());
    }
}
