//! Experiment configuration for llm-perf.
//!
//! An experiment is one (model, attention implementation, weights
//! configuration) combination, described by an [`ExperimentConfig`] that
//! bundles the benchmark, launcher and backend settings handed to the
//! external runner.

pub mod backend;
pub mod benchmark;
pub mod dtype;
pub mod experiment;
pub mod launcher;
pub mod models;
pub mod settings;
pub mod weights;

pub use backend::BackendConfig;
pub use benchmark::{GenerateKwargs, InferenceConfig, InputShapes};
pub use dtype::{AttnImplementation, QuantScheme, TorchDtype};
pub use experiment::ExperimentConfig;
pub use launcher::{IsolationAction, ProcessConfig, StartMethod};
pub use settings::SweepSettings;
pub use weights::{NamedWeightsConfig, Subset, WeightsConfig};
