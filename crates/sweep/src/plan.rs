//! Cartesian product of models, attention implementations and weights configurations.

use llmperf_config::{
    AttnImplementation, ExperimentConfig, NamedWeightsConfig, SweepSettings,
};

/// One point of the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub model: String,
    pub attn_implementation: AttnImplementation,
    pub weights: NamedWeightsConfig,
}

impl Combination {
    pub fn experiment_config(&self) -> ExperimentConfig {
        ExperimentConfig::for_combination(&self.model, self.attn_implementation, &self.weights)
    }

    pub fn experiment_name(&self) -> String {
        llmperf_config::experiment::experiment_name(self.weights.name, self.attn_implementation)
    }

    pub fn subfolder(&self) -> String {
        llmperf_config::experiment::subfolder(&self.experiment_name(), &self.model)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SweepPlan {
    combinations: Vec<Combination>,
}

impl SweepPlan {
    /// Model-major product: every attention and weights config per model.
    pub fn new(
        models: &[&str],
        attentions: &[AttnImplementation],
        weights: &[NamedWeightsConfig],
    ) -> Self {
        let mut combinations = Vec::with_capacity(models.len() * attentions.len() * weights.len());
        for model in models {
            for attn in attentions {
                for named in weights {
                    combinations.push(Combination {
                        model: model.to_string(),
                        attn_implementation: *attn,
                        weights: named.clone(),
                    });
                }
            }
        }
        Self { combinations }
    }

    pub fn from_settings(settings: &SweepSettings) -> Self {
        Self::new(
            settings.models(),
            &AttnImplementation::ALL,
            &settings.subset.weights_configs(),
        )
    }

    pub fn combinations(&self) -> &[Combination] {
        &self.combinations
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmperf_config::models::{CANONICAL_MODELS, PRETRAINED_MODELS};
    use llmperf_config::Subset;

    #[test]
    fn test_product_count() {
        let weights = Subset::Awq.weights_configs();
        let plan = SweepPlan::new(
            &["a/x", "b/y"],
            &AttnImplementation::ALL,
            &weights,
        );
        assert_eq!(plan.len(), 2 * 3 * 4);
    }

    #[test]
    fn test_model_major_order() {
        let weights = Subset::Unquantized.weights_configs();
        let plan = SweepPlan::new(
            &["a/x", "b/y"],
            &[AttnImplementation::Eager, AttnImplementation::Sdpa],
            &weights,
        );
        let first = &plan.combinations()[0];
        assert_eq!(first.model, "a/x");
        assert_eq!(first.attn_implementation, AttnImplementation::Eager);
        assert_eq!(first.weights.name, "float32");

        let second = &plan.combinations()[1];
        assert_eq!(second.weights.name, "float16");

        let fourth = &plan.combinations()[3];
        assert_eq!(fourth.attn_implementation, AttnImplementation::Sdpa);
        assert_eq!(plan.combinations()[6].model, "b/y");
    }

    #[test]
    fn test_empty_inputs() {
        let plan = SweepPlan::new(&[], &AttnImplementation::ALL, &Subset::Bnb.weights_configs());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_from_settings() {
        let mut settings = SweepSettings::default();
        assert_eq!(SweepPlan::from_settings(&settings).len(), CANONICAL_MODELS.len() * 3 * 3);
        settings.canonical_models_only = false;
        settings.subset = Subset::Gptq;
        assert_eq!(SweepPlan::from_settings(&settings).len(), PRETRAINED_MODELS.len() * 3 * 2);
    }

    #[test]
    fn test_combination_naming_matches_config() {
        let plan = SweepPlan::new(
            &["mistralai/Mistral-7B-v0.1"],
            &[AttnImplementation::Sdpa],
            &Subset::Bnb.weights_configs(),
        );
        let combination = &plan.combinations()[1];
        assert_eq!(combination.subfolder(), "8bit-bnb-sdpa/mistralai--Mistral-7B-v0.1");
        assert_eq!(combination.subfolder(), combination.experiment_config().subfolder());
    }
}
