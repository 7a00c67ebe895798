//! Process launcher settings for the external runner.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartMethod {
    Spawn,
    Fork,
}

/// What the runner does when another process shows up on an isolated device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationAction {
    Error,
    Warn,
    Kill,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub name: String,
    pub start_method: StartMethod,
    pub device_isolation: bool,
    pub device_isolation_action: IsolationAction,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            name: "process".into(),
            start_method: StartMethod::Spawn,
            device_isolation: false,
            device_isolation_action: IsolationAction::Warn,
        }
    }
}

impl ProcessConfig {
    /// Spawned, isolated, and failing hard on device contention.
    pub fn isolated() -> Self {
        Self {
            device_isolation: true,
            device_isolation_action: IsolationAction::Error,
            ..Self::default()
        }
    }
}
