//! Skip predicates applied before launching a combination.

use crate::store::ResultStore;
use llmperf_config::{AttnImplementation, ExperimentConfig, TorchDtype};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The dtype / attention combination cannot run.
    Unsupported,
    /// An identical configuration already has a report in the store.
    AlreadyConducted,
}

/// Flash Attention 2 only runs in half precision.
pub fn is_experiment_not_supported(torch_dtype: TorchDtype, attn: AttnImplementation) -> bool {
    attn == AttnImplementation::FlashAttention2 && torch_dtype == TorchDtype::Float32
}

/// True when the stored configuration equals `config` and a report exists.
///
/// Store errors count as "not conducted".
pub fn is_experiment_conducted(
    store: &dyn ResultStore,
    config: &ExperimentConfig,
    repo_id: &str,
    subfolder: &str,
) -> bool {
    let current = match serde_json::to_value(config) {
        Ok(value) => value,
        Err(_) => return false,
    };

    match store.load_experiment_config(repo_id, subfolder) {
        Ok(Some(stored)) if stored == current => {}
        Ok(_) => return false,
        Err(e) => {
            debug!(error = %e, subfolder, "could not load stored experiment config");
            return false;
        }
    }

    match store.has_benchmark_report(repo_id, subfolder) {
        Ok(found) => found,
        Err(e) => {
            debug!(error = %e, subfolder, "could not load stored benchmark report");
            false
        }
    }
}
