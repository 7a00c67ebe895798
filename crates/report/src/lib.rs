//! Benchmark reports and their aggregation across experiment directories.

pub mod aggregate;
pub mod report;

pub use aggregate::{load_experiment, AggregatedMetrics, ExperimentMetrics, Metric, MetricsError};
pub use report::{
    BenchmarkReport, Efficiency, Energy, Latency, Memory, TargetMeasurements, Throughput,
    BENCHMARK_REPORT_FILE,
};
