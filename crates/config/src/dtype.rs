//! Precision, attention and quantization identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorchDtype {
    Float32,
    Float16,
    Bfloat16,
}

impl TorchDtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            TorchDtype::Float32 => "float32",
            TorchDtype::Float16 => "float16",
            TorchDtype::Bfloat16 => "bfloat16",
        }
    }
}

impl fmt::Display for TorchDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TorchDtype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "float32" => Ok(TorchDtype::Float32),
            "float16" => Ok(TorchDtype::Float16),
            "bfloat16" => Ok(TorchDtype::Bfloat16),
            other => Err(format!("Unknown torch dtype: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttnImplementation {
    Eager,
    Sdpa,
    #[serde(rename = "flash_attention_2")]
    FlashAttention2,
}

impl AttnImplementation {
    /// Every implementation a sweep covers, in sweep order.
    pub const ALL: [AttnImplementation; 3] = [
        AttnImplementation::Eager,
        AttnImplementation::Sdpa,
        AttnImplementation::FlashAttention2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttnImplementation::Eager => "eager",
            AttnImplementation::Sdpa => "sdpa",
            AttnImplementation::FlashAttention2 => "flash_attention_2",
        }
    }
}

impl fmt::Display for AttnImplementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttnImplementation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "eager" => Ok(AttnImplementation::Eager),
            "sdpa" => Ok(AttnImplementation::Sdpa),
            "flash_attention_2" => Ok(AttnImplementation::FlashAttention2),
            other => Err(format!("Unknown attention implementation: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantScheme {
    Bnb,
    Gptq,
    Awq,
}

impl QuantScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantScheme::Bnb => "bnb",
            QuantScheme::Gptq => "gptq",
            QuantScheme::Awq => "awq",
        }
    }
}

impl fmt::Display for QuantScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
