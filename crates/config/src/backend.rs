//! PyTorch backend settings forwarded to the external runner.

use crate::dtype::{AttnImplementation, QuantScheme, TorchDtype};
use crate::weights::WeightsConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub name: String,
    pub model: String,
    pub device: String,
    pub device_ids: String,
    /// Initialize random weights from the model config instead of downloading.
    pub no_weights: bool,
    pub library: String,
    pub task: String,
    pub torch_dtype: TorchDtype,
    pub quantization_scheme: Option<QuantScheme>,
    pub quantization_config: Map<String, Value>,
    pub attn_implementation: AttnImplementation,

    pub eval_mode: bool,
    pub disable_grad: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_map: Option<String>,
    pub amp_autocast: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amp_dtype: Option<TorchDtype>,
    pub torch_compile: bool,
    #[serde(default)]
    pub torch_compile_kwargs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter_op_num_threads: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intra_op_num_threads: Option<usize>,
}

impl BackendConfig {
    /// Text-generation on the first CUDA device with random weights.
    pub fn cuda_text_generation(
        model: impl Into<String>,
        weights: &WeightsConfig,
        attn_implementation: AttnImplementation,
    ) -> Self {
        Self {
            name: "pytorch".into(),
            model: model.into(),
            device: "cuda".into(),
            device_ids: "0".into(),
            no_weights: true,
            library: "transformers".into(),
            task: "text-generation".into(),
            torch_dtype: weights.torch_dtype,
            quantization_scheme: weights.quant_scheme,
            quantization_config: weights.quant_config.clone(),
            attn_implementation,
            eval_mode: true,
            disable_grad: true,
            device_map: None,
            amp_autocast: false,
            amp_dtype: None,
            torch_compile: false,
            torch_compile_kwargs: Map::new(),
            inter_op_num_threads: None,
            intra_op_num_threads: None,
        }
    }

    /// Reject combinations the backend cannot load.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model id must not be empty".into());
        }
        if self.quantization_scheme == Some(QuantScheme::Gptq) && !self.no_weights {
            return Err(
                "GPTQ quantization of pretrained weights is not supported; \
                 pre-quantized models need no quantization scheme"
                    .into(),
            );
        }
        if self.quantization_scheme.is_none() && !self.quantization_config.is_empty() {
            return Err("Quantization config given without a quantization scheme".into());
        }
        if self.amp_dtype.is_some() && !self.amp_autocast {
            return Err("amp_dtype requires amp_autocast".into());
        }
        if self.inter_op_num_threads == Some(0) || self.intra_op_num_threads == Some(0) {
            return Err("Thread counts must be > 0".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::Subset;

    fn backend(subset: Subset, weights: &str) -> BackendConfig {
        let weights = subset.weights_config(weights).unwrap();
        BackendConfig::cuda_text_generation("facebook/opt-125m", &weights, AttnImplementation::Sdpa)
    }

    #[test]
    fn test_sweep_backend_valid() {
        for subset in [Subset::Unquantized, Subset::Bnb, Subset::Gptq, Subset::Awq] {
            for named in subset.weights_configs() {
                assert!(backend(subset, named.name).validate().is_ok(), "{}", named.name);
            }
        }
    }

    #[test]
    fn test_gptq_requires_no_weights() {
        let mut config = backend(Subset::Gptq, "4bit-gptq-exllama-v2");
        config.no_weights = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_backend() {
        let mut config = backend(Subset::Unquantized, "float16");
        config.amp_dtype = Some(TorchDtype::Float16);
        assert!(config.validate().is_err());

        config = backend(Subset::Unquantized, "float16");
        config.intra_op_num_threads = Some(0);
        assert!(config.validate().is_err());

        config = backend(Subset::Unquantized, "float16");
        config
            .quantization_config
            .insert("bits".into(), Value::from(4));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_optional_fields_skipped() {
        let json = serde_json::to_value(backend(Subset::Unquantized, "bfloat16")).unwrap();
        assert_eq!(json["torch_dtype"], "bfloat16");
        assert_eq!(json["attn_implementation"], "sdpa");
        assert!(json.get("device_map").is_none());
        assert!(json["quantization_scheme"].is_null());
    }
}
