//! Chart descriptions, independent of any drawing backend.

use llmperf_report::{AggregatedMetrics, Metric};
use serde::Serialize;
use std::collections::BTreeMap;

pub const X_LABEL: &str = "Batch Size";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// File stem of the rendered image.
    pub title: &'static str,
    pub heading: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub kind: ChartKind,
    #[serde(skip)]
    pub metric: Metric,
    /// Mean value per batch size, ascending by batch size.
    pub points: Vec<(u64, f64)>,
}

impl ChartSpec {
    pub fn file_name(&self) -> String {
        format!("{}.png", self.title)
    }

    /// Upper bound of the value axis; 1.0 when there is nothing to show.
    pub fn y_max(&self) -> f64 {
        let max = self.points.iter().map(|&(_, v)| v).fold(0.0, f64::max);
        if max > 0.0 {
            max * 1.1
        } else {
            1.0
        }
    }
}

const LAYOUT: [(&str, &str, &str, ChartKind, Metric); 6] = [
    (
        "decode_memory",
        "Decode Max Memory per batch size",
        "Max RAM (MB)",
        ChartKind::Bar,
        Metric::DecodeMaxRam,
    ),
    (
        "prefill_memory",
        "Prefill Max Memory per batch size",
        "Max RAM (MB)",
        ChartKind::Bar,
        Metric::PrefillMaxRam,
    ),
    (
        "decode_latency",
        "Decode Latency per Batch Size",
        "Mean Latency (s)",
        ChartKind::Line,
        Metric::DecodeMeanLatency,
    ),
    (
        "prefill_latency",
        "Prefill Latency per Batch Size",
        "Mean Latency (s)",
        ChartKind::Line,
        Metric::PrefillMeanLatency,
    ),
    (
        "decode_throughput",
        "Decode throughput per batch size",
        "Decode throughput",
        ChartKind::Bar,
        Metric::DecodeThroughput,
    ),
    (
        "prefill_throughput",
        "Prefill Throughput per batch size",
        "Prefill throughput",
        ChartKind::Bar,
        Metric::PrefillThroughput,
    ),
];

/// The six charts in render order.
pub fn charts(metrics: &AggregatedMetrics) -> Vec<ChartSpec> {
    LAYOUT
        .iter()
        .map(|&(title, heading, y_label, kind, metric)| ChartSpec {
            title,
            heading,
            x_label: X_LABEL,
            y_label,
            kind,
            metric,
            points: group_by_batch_size(&metrics.series(metric)),
        })
        .collect()
}

/// Average values that share a batch size.
pub fn group_by_batch_size(series: &[(u64, f64)]) -> Vec<(u64, f64)> {
    let mut groups: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for &(batch_size, value) in series {
        let entry = groups.entry(batch_size).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(batch_size, (sum, count))| (batch_size, sum / count as f64))
        .collect()
}
