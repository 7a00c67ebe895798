//! Experiment configuration: everything the runner needs for one combination.

use crate::backend::BackendConfig;
use crate::benchmark::InferenceConfig;
use crate::dtype::AttnImplementation;
use crate::launcher::ProcessConfig;
use crate::weights::NamedWeightsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name of a stored experiment configuration.
pub const EXPERIMENT_CONFIG_FILE: &str = "experiment_config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub experiment_name: String,
    pub benchmark: InferenceConfig,
    pub launcher: ProcessConfig,
    pub backend: BackendConfig,
}

impl ExperimentConfig {
    /// Build the llm-perf experiment for one sweep combination.
    pub fn for_combination(
        model: &str,
        attn_implementation: AttnImplementation,
        weights: &NamedWeightsConfig,
    ) -> Self {
        Self {
            experiment_name: experiment_name(weights.name, attn_implementation),
            benchmark: InferenceConfig::llm_perf(),
            launcher: ProcessConfig::isolated(),
            backend: BackendConfig::cuda_text_generation(
                model,
                &weights.config,
                attn_implementation,
            ),
        }
    }

    /// Store key for this experiment: `<experiment_name>/<model with / as -->`.
    pub fn subfolder(&self) -> String {
        subfolder(&self.experiment_name, &self.backend.model)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.experiment_name.is_empty() {
            return Err("Experiment name must not be empty".into());
        }
        self.benchmark.validate()?;
        self.backend.validate()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

pub fn experiment_name(weights_config: &str, attn_implementation: AttnImplementation) -> String {
    format!("{}-{}", weights_config, attn_implementation)
}

pub fn subfolder(experiment_name: &str, model: &str) -> String {
    format!("{}/{}", experiment_name, model.replace('/', "--"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::Subset;

    fn sample() -> ExperimentConfig {
        let weights = Subset::Bnb.weights_configs().remove(0);
        ExperimentConfig::for_combination(
            "meta-llama/Llama-2-7b-hf",
            AttnImplementation::FlashAttention2,
            &weights,
        )
    }

    #[test]
    fn test_naming() {
        let config = sample();
        assert_eq!(config.experiment_name, "4bit-bnb-flash_attention_2");
        assert_eq!(
            config.subfolder(),
            "4bit-bnb-flash_attention_2/meta-llama--Llama-2-7b-hf"
        );
    }

    #[test]
    fn test_backend_attention_name_matches_experiment_name() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["backend"]["attn_implementation"], "flash_attention_2");
        assert!(json["experiment_name"]
            .as_str()
            .unwrap()
            .ends_with(json["backend"]["attn_implementation"].as_str().unwrap()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(EXPERIMENT_CONFIG_FILE);
        let config = sample();
        config.save(&path).unwrap();
        let loaded = ExperimentConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_sweep_experiment_is_valid() {
        let config = sample();
        assert!(config.validate().is_ok());
        assert!(config.launcher.device_isolation);
        assert_eq!(config.backend.device, "cuda");
        assert!(config.backend.no_weights);
    }
}
