//! Classification and reporting of failed experiments.
//!
//! Known failure modes get an empty benchmark report pushed so the
//! combination counts as conducted and is not retried by the next sweep.

use crate::store::ResultStore;
use llmperf_report::BenchmarkReport;
use std::fmt;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    CudaOutOfMemory,
    GptqOutFeatures,
    GptqGroupSize,
    FlashAttention2Unsupported,
    SdpaUnsupported,
    FlashAttentionDtype,
    Unknown,
}

impl FailureKind {
    pub fn classify(message: &str) -> Self {
        let gptq = message.contains("gptq");
        if message.contains("torch.cuda.OutOfMemoryError") {
            FailureKind::CudaOutOfMemory
        } else if gptq && message.contains("assert outfeatures % 32 == 0") {
            FailureKind::GptqOutFeatures
        } else if gptq && message.contains("assert infeatures % self.group_size == 0") {
            FailureKind::GptqGroupSize
        } else if message.contains("support Flash Attention 2.0") {
            FailureKind::FlashAttention2Unsupported
        } else if message.contains(
            "support an attention implementation through torch.nn.functional.scaled_dot_product_attention",
        ) {
            FailureKind::SdpaUnsupported
        } else if message.contains("FlashAttention only support fp16 and bf16 data type") {
            FailureKind::FlashAttentionDtype
        } else {
            FailureKind::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        *self != FailureKind::Unknown
    }

    pub fn description(&self) -> &'static str {
        match self {
            FailureKind::CudaOutOfMemory => "CUDA: Out of memory",
            FailureKind::GptqOutFeatures => "GPTQ: assert outfeatures % 32 == 0",
            FailureKind::GptqGroupSize => "GPTQ: assert infeatures % self.group_size == 0",
            FailureKind::FlashAttention2Unsupported => "Flash Attention 2.0: not supported yet",
            FailureKind::SdpaUnsupported => "SDPA: not supported yet",
            FailureKind::FlashAttentionDtype => {
                "FlashAttention: only support fp16 and bf16 data type"
            }
            FailureKind::Unknown => "Unknown error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Log a failed experiment and record known failures in the store.
pub fn report_failure(
    err: &anyhow::Error,
    store: &dyn ResultStore,
    repo_id: &str,
    subfolder: &str,
) -> FailureKind {
    let message = format!("{:#}", err);
    let kind = FailureKind::classify(&message);

    if !kind.is_known() {
        error!(subfolder, error = %message, "Unknown error");
        return kind;
    }

    error!(subfolder, "{}", kind);
    let report = BenchmarkReport::empty_text_generation();
    report.log();
    if let Err(e) = store.push_benchmark_report(&report, repo_id, subfolder, true) {
        warn!(subfolder, error = %e, "failed to record failed experiment");
    }
    kind
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;

    #[test]
    fn test_classify() {
        let cases = [
            ("torch.cuda.OutOfMemoryError: CUDA out of memory.", FailureKind::CudaOutOfMemory),
            ("gptq kernel: assert outfeatures % 32 == 0", FailureKind::GptqOutFeatures),
            (
                "gptq: assert infeatures % self.group_size == 0",
                FailureKind::GptqGroupSize,
            ),
            (
                "GPTNeoX does not support Flash Attention 2.0 yet",
                FailureKind::FlashAttention2Unsupported,
            ),
            (
                "does not support an attention implementation through torch.nn.functional.scaled_dot_product_attention yet",
                FailureKind::SdpaUnsupported,
            ),
            (
                "RuntimeError: FlashAttention only support fp16 and bf16 data type",
                FailureKind::FlashAttentionDtype,
            ),
            ("segfault", FailureKind::Unknown),
        ];
        for (message, expected) in cases {
            assert_eq!(FailureKind::classify(message), expected, "{}", message);
        }
    }

    #[test]
    fn test_gptq_asserts_need_gptq_context() {
        assert_eq!(
            FailureKind::classify("assert outfeatures % 32 == 0"),
            FailureKind::Unknown
        );
    }

    #[test]
    fn test_known_failure_pushes_empty_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = anyhow::anyhow!("torch.cuda.OutOfMemoryError").context("runner exited with 1");
        let kind = report_failure(&err, &store, "org/repo", "float32-eager/org--model");
        assert_eq!(kind, FailureKind::CudaOutOfMemory);
        let report = store
            .load_benchmark_report("org/repo", "float32-eager/org--model")
            .unwrap()
            .unwrap();
        assert!(report.is_empty());
        assert!(report.target("per_token").is_some());
    }

    #[test]
    fn test_unknown_failure_pushes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        let err = anyhow::anyhow!("boom");
        assert_eq!(
            report_failure(&err, &store, "org/repo", "exp/model"),
            FailureKind::Unknown
        );
        assert!(store.load_benchmark_report("org/repo", "exp/model").unwrap().is_none());
    }
}
