//! LLM inference benchmark sweeps and result plotting.
//!
//! Facade over the workspace crates:
//!
//! - [`config`]: experiment configuration model and sweep settings
//! - [`report`]: benchmark reports and experiment-directory aggregation
//! - [`sweep`]: combination enumeration, skip predicates and the sweep runner
//! - [`plot`]: chart descriptions and PNG rendering
//! - [`harness`]: plot pipeline and sweep session wiring

pub use llmperf_config as config;
pub use llmperf_harness as harness;
pub use llmperf_plot as plot;
pub use llmperf_report as report;
pub use llmperf_sweep as sweep;
