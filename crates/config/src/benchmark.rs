//! Inference benchmark settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputShapes {
    pub batch_size: usize,
    pub sequence_length: usize,
}

impl Default for InputShapes {
    fn default() -> Self {
        Self {
            batch_size: 1,
            sequence_length: 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateKwargs {
    pub max_new_tokens: usize,
    pub min_new_tokens: usize,
}

impl Default for GenerateKwargs {
    fn default() -> Self {
        Self {
            max_new_tokens: 64,
            min_new_tokens: 64,
        }
    }
}

/// What the external runner measures and for how long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceConfig {
    pub name: String,
    pub memory: bool,
    pub energy: bool,
    pub latency: bool,
    /// Minimum measurement duration in seconds.
    pub duration: u64,
    pub iterations: usize,
    pub warmup_runs: usize,
    pub input_shapes: InputShapes,
    pub generate_kwargs: GenerateKwargs,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            name: "inference".into(),
            memory: false,
            energy: false,
            latency: true,
            duration: 10,
            iterations: 10,
            warmup_runs: 10,
            input_shapes: InputShapes::default(),
            generate_kwargs: GenerateKwargs::default(),
        }
    }
}

impl InferenceConfig {
    /// Settings used by the llm-perf sweep: every tracker enabled.
    pub fn llm_perf() -> Self {
        Self {
            memory: true,
            energy: true,
            latency: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.memory || self.energy || self.latency) {
            return Err("At least one of memory, energy or latency must be tracked".into());
        }
        if self.input_shapes.batch_size == 0 || self.input_shapes.sequence_length == 0 {
            return Err("Input shapes must be > 0".into());
        }
        if self.generate_kwargs.min_new_tokens > self.generate_kwargs.max_new_tokens {
            return Err("min_new_tokens must not exceed max_new_tokens".into());
        }
        if self.iterations == 0 {
            return Err("Iterations must be > 0".into());
        }
        Ok(())
    }
}
