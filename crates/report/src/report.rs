//! Benchmark report written by the external runner.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// File name of a stored benchmark report.
pub const BENCHMARK_REPORT_FILE: &str = "benchmark_report.json";

/// Targets of a text-generation benchmark.
pub const TEXT_GENERATION_TARGETS: [&str; 4] = ["load", "prefill", "decode", "per_token"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_global_vram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_process_vram: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_reserved: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_allocated: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Latency {
    pub unit: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub mean: f64,
    #[serde(default)]
    pub stdev: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p50: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p90: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p95: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p99: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Throughput {
    pub unit: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Energy {
    pub unit: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub ram: f64,
    #[serde(default)]
    pub gpu: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Efficiency {
    pub unit: String,
    pub value: f64,
}

/// Measurements for one benchmark target (prefill, decode, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetMeasurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Memory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency: Option<Latency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<Throughput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<Energy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub efficiency: Option<Efficiency>,
}

impl TargetMeasurements {
    pub fn is_empty(&self) -> bool {
        self.memory.is_none()
            && self.latency.is_none()
            && self.throughput.is_none()
            && self.energy.is_none()
            && self.efficiency.is_none()
    }
}

/// Complete report: one entry per target, serialized at the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    #[serde(flatten)]
    pub targets: BTreeMap<String, TargetMeasurements>,
}

impl BenchmarkReport {
    /// Report with the given targets and no measurements.
    pub fn from_targets(targets: &[&str]) -> Self {
        Self {
            targets: targets
                .iter()
                .map(|target| (target.to_string(), TargetMeasurements::default()))
                .collect(),
        }
    }

    /// Placeholder recorded for a combination that failed in a known way.
    pub fn empty_text_generation() -> Self {
        Self::from_targets(&TEXT_GENERATION_TARGETS)
    }

    pub fn target(&self, name: &str) -> Option<&TargetMeasurements> {
        self.targets.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.targets.values().all(TargetMeasurements::is_empty)
    }

    pub fn log(&self) {
        for (name, target) in &self.targets {
            info!(
                target_name = %name,
                latency_mean_s = target.latency.as_ref().map(|l| l.mean),
                max_ram_mb = target.memory.as_ref().and_then(|m| m.max_ram),
                throughput = target.throughput.as_ref().map(|t| t.value),
                energy_kwh = target.energy.as_ref().map(|e| e.total),
                "benchmark target"
            );
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save report to JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load report from JSON file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}
