//! Model lists swept by llm-perf.

/// Small list of representative models, one or two per architecture family.
pub const CANONICAL_MODELS: &[&str] = &[
    "bigscience/bloomz-560m",
    "EleutherAI/gpt-neox-20b",
    "EleutherAI/pythia-1.4b",
    "facebook/opt-350m",
    "google/gemma-2b",
    "google/gemma-7b",
    "meta-llama/Llama-2-7b-hf",
    "meta-llama/Llama-2-13b-hf",
    "microsoft/phi-2",
    "mistralai/Mistral-7B-v0.1",
    "Qwen/Qwen1.5-7B",
    "tiiuae/falcon-7b",
];

/// Full list of pretrained text-generation models.
pub const PRETRAINED_MODELS: &[&str] = &[
    // bloom
    "bigscience/bloomz-560m",
    "bigscience/bloom-1b7",
    "bigscience/bloom-7b1",
    // gpt-neox / pythia
    "EleutherAI/gpt-neox-20b",
    "EleutherAI/pythia-160m",
    "EleutherAI/pythia-1.4b",
    "EleutherAI/pythia-6.9b",
    "EleutherAI/pythia-12b",
    // gpt-j
    "EleutherAI/gpt-j-6b",
    // opt
    "facebook/opt-125m",
    "facebook/opt-350m",
    "facebook/opt-1.3b",
    "facebook/opt-6.7b",
    "facebook/opt-13b",
    // gemma
    "google/gemma-2b",
    "google/gemma-7b",
    // llama
    "meta-llama/Llama-2-7b-hf",
    "meta-llama/Llama-2-13b-hf",
    "meta-llama/Llama-2-70b-hf",
    // phi
    "microsoft/phi-1_5",
    "microsoft/phi-2",
    // mistral / mixtral
    "mistralai/Mistral-7B-v0.1",
    "mistralai/Mixtral-8x7B-v0.1",
    // qwen
    "Qwen/Qwen1.5-0.5B",
    "Qwen/Qwen1.5-1.8B",
    "Qwen/Qwen1.5-7B",
    "Qwen/Qwen1.5-14B",
    // falcon
    "tiiuae/falcon-7b",
    "tiiuae/falcon-40b",
    // starcoder
    "bigcode/starcoder2-3b",
    "bigcode/starcoder2-7b",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_models_are_pretrained() {
        for model in CANONICAL_MODELS {
            assert!(PRETRAINED_MODELS.contains(model), "{}", model);
        }
    }

    #[test]
    fn test_model_ids_have_org() {
        for model in PRETRAINED_MODELS {
            assert_eq!(model.split('/').count(), 2, "{}", model);
        }
    }
}
