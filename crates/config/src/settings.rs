//! Sweep settings read from the environment.

use crate::models::{CANONICAL_MODELS, PRETRAINED_MODELS};
use crate::weights::Subset;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MACHINE: &str = "1xA100";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Hardware label, part of the push repository id.
    pub machine: String,
    pub subset: Subset,
    pub canonical_models_only: bool,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            machine: DEFAULT_MACHINE.into(),
            subset: Subset::Unquantized,
            canonical_models_only: true,
        }
    }
}

impl SweepSettings {
    /// Read settings from environment variables.
    /// Expects: MACHINE, SUBSET, CANONICAL_MODELS_ONLY (all optional)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let machine = lookup("MACHINE").unwrap_or(defaults.machine);
        let subset = match lookup("SUBSET") {
            Some(value) => value.parse()?,
            None => defaults.subset,
        };
        let canonical_models_only = lookup("CANONICAL_MODELS_ONLY")
            .map(|value| value == "1")
            .unwrap_or(defaults.canonical_models_only);

        Ok(Self {
            machine,
            subset,
            canonical_models_only,
        })
    }

    /// Results repository: `optimum-benchmark/llm-perf-pytorch-cuda-<subset>-<machine>`.
    pub fn push_repo_id(&self) -> String {
        format!(
            "optimum-benchmark/llm-perf-pytorch-cuda-{}-{}",
            self.subset, self.machine
        )
    }

    pub fn models(&self) -> &'static [&'static str] {
        if self.canonical_models_only {
            CANONICAL_MODELS
        } else {
            PRETRAINED_MODELS
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = SweepSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, SweepSettings::default());
        assert_eq!(
            settings.push_repo_id(),
            "optimum-benchmark/llm-perf-pytorch-cuda-unquantized-1xA100"
        );
        assert_eq!(settings.models().len(), CANONICAL_MODELS.len());
    }

    #[test]
    fn test_overrides() {
        let settings = SweepSettings::from_lookup(lookup(&[
            ("MACHINE", "1xH100"),
            ("SUBSET", "awq"),
            ("CANONICAL_MODELS_ONLY", "0"),
        ]))
        .unwrap();
        assert_eq!(settings.subset, Subset::Awq);
        assert!(!settings.canonical_models_only);
        assert_eq!(settings.models().len(), PRETRAINED_MODELS.len());
        assert_eq!(
            settings.push_repo_id(),
            "optimum-benchmark/llm-perf-pytorch-cuda-awq-1xH100"
        );
    }

    #[test]
    fn test_only_one_means_canonical() {
        let settings =
            SweepSettings::from_lookup(lookup(&[("CANONICAL_MODELS_ONLY", "true")])).unwrap();
        assert!(!settings.canonical_models_only);
    }

    #[test]
    fn test_unknown_subset() {
        assert!(SweepSettings::from_lookup(lookup(&[("SUBSET", "fp8")])).is_err());
    }
}
