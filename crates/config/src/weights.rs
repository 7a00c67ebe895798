//! Weights configurations: precision plus optional quantization.
//!
//! Each [`Subset`] names a family of weights configurations that are swept
//! together and pushed to their own results repository.

use crate::dtype::{QuantScheme, TorchDtype};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub torch_dtype: TorchDtype,
    pub quant_scheme: Option<QuantScheme>,
    pub quant_config: Map<String, Value>,
}

impl WeightsConfig {
    /// Plain precision, no quantization.
    pub fn unquantized(torch_dtype: TorchDtype) -> Self {
        Self {
            torch_dtype,
            quant_scheme: None,
            quant_config: Map::new(),
        }
    }

    pub fn quantized(
        torch_dtype: TorchDtype,
        scheme: QuantScheme,
        quant_config: Map<String, Value>,
    ) -> Self {
        Self {
            torch_dtype,
            quant_scheme: Some(scheme),
            quant_config,
        }
    }
}

/// A weights configuration with the name used in experiment names.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedWeightsConfig {
    pub name: &'static str,
    pub config: WeightsConfig,
}

impl NamedWeightsConfig {
    fn new(name: &'static str, config: WeightsConfig) -> Self {
        Self { name, config }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subset {
    Unquantized,
    Bnb,
    Gptq,
    Awq,
}

impl Subset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subset::Unquantized => "unquantized",
            Subset::Bnb => "bnb",
            Subset::Gptq => "gptq",
            Subset::Awq => "awq",
        }
    }

    /// Weights configurations of this subset, in sweep order.
    pub fn weights_configs(&self) -> Vec<NamedWeightsConfig> {
        match self {
            Subset::Unquantized => vec![
                NamedWeightsConfig::new("float32", WeightsConfig::unquantized(TorchDtype::Float32)),
                NamedWeightsConfig::new("float16", WeightsConfig::unquantized(TorchDtype::Float16)),
                NamedWeightsConfig::new(
                    "bfloat16",
                    WeightsConfig::unquantized(TorchDtype::Bfloat16),
                ),
            ],
            Subset::Bnb => vec![
                NamedWeightsConfig::new(
                    "4bit-bnb",
                    WeightsConfig::quantized(
                        TorchDtype::Float16,
                        QuantScheme::Bnb,
                        options([("load_in_4bit", json!(true))]),
                    ),
                ),
                NamedWeightsConfig::new(
                    "8bit-bnb",
                    WeightsConfig::quantized(
                        TorchDtype::Float16,
                        QuantScheme::Bnb,
                        options([("load_in_8bit", json!(true))]),
                    ),
                ),
            ],
            Subset::Gptq => [1, 2]
                .into_iter()
                .map(|version| {
                    let name = if version == 1 {
                        "4bit-gptq-exllama-v1"
                    } else {
                        "4bit-gptq-exllama-v2"
                    };
                    NamedWeightsConfig::new(
                        name,
                        WeightsConfig::quantized(
                            TorchDtype::Float16,
                            QuantScheme::Gptq,
                            options([
                                ("bits", json!(4)),
                                ("use_exllama", json!(true)),
                                ("version", json!(version)),
                                ("model_seqlen", json!(256)),
                            ]),
                        ),
                    )
                })
                .collect(),
            Subset::Awq => vec![
                NamedWeightsConfig::new(
                    "4bit-awq-gemm",
                    WeightsConfig::quantized(
                        TorchDtype::Float16,
                        QuantScheme::Awq,
                        options([("bits", json!(4)), ("version", json!("gemm"))]),
                    ),
                ),
                NamedWeightsConfig::new(
                    "4bit-awq-gemv",
                    WeightsConfig::quantized(
                        TorchDtype::Float16,
                        QuantScheme::Awq,
                        options([("bits", json!(4)), ("version", json!("gemv"))]),
                    ),
                ),
                NamedWeightsConfig::new("4bit-awq-exllama-v1", awq_exllama(1)),
                NamedWeightsConfig::new("4bit-awq-exllama-v2", awq_exllama(2)),
            ],
        }
    }

    /// Look up a weights configuration of this subset by name.
    pub fn weights_config(&self, name: &str) -> Option<WeightsConfig> {
        self.weights_configs()
            .into_iter()
            .find(|named| named.name == name)
            .map(|named| named.config)
    }
}

fn awq_exllama(version: u32) -> WeightsConfig {
    WeightsConfig::quantized(
        TorchDtype::Float16,
        QuantScheme::Awq,
        options([
            ("bits", json!(4)),
            ("version", json!("exllama")),
            (
                "exllama_config",
                json!({
                    "version": version,
                    "max_input_len": 64,
                    "max_batch_size": 1,
                }),
            ),
        ]),
    )
}

fn options<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unquantized" => Ok(Subset::Unquantized),
            "bnb" => Ok(Subset::Bnb),
            "gptq" => Ok(Subset::Gptq),
            "awq" => Ok(Subset::Awq),
            other => Err(format!(
                "Unknown subset: {} (expected unquantized, bnb, gptq or awq)",
                other
            )),
        }
    }
}
