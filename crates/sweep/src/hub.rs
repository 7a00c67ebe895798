//! Hugging Face Hub dataset repositories as a result store.

use crate::store::ResultStore;
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

#[derive(Error, Debug)]
pub enum HubError {
    #[error("HF_TOKEN environment variable not set")]
    MissingToken,

    #[error("invalid repo id (expected 'org/name'): {0}")]
    InvalidRepoId(String),

    #[error("hub request failed (HTTP {code}): {body}")]
    Status { code: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ureq::Error> for HubError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, resp) => HubError::Status {
                code,
                body: resp.into_string().unwrap_or_default(),
            },
            other => HubError::Network(other.to_string()),
        }
    }
}

/// Stores files in hub dataset repositories through the HTTP API.
pub struct HubStore {
    endpoint: String,
    token: Option<String>,
    agent: ureq::Agent,
    created: Mutex<HashSet<String>>,
}

impl HubStore {
    /// Create from environment variables.
    /// Reads: HF_TOKEN (required for pushes), HF_ENDPOINT (optional)
    pub fn from_env() -> Self {
        let endpoint = std::env::var("HF_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.into());
        Self::new(endpoint, std::env::var("HF_TOKEN").ok())
    }

    pub fn new(endpoint: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(120))
            .build();
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token,
            agent,
            created: Mutex::new(HashSet::new()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> Result<&str, HubError> {
        self.token.as_deref().ok_or(HubError::MissingToken)
    }

    fn request(&self, method: &str, url: &str) -> ureq::Request {
        let request = self.agent.request(method, url);
        match &self.token {
            Some(token) => request.set("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }

    pub fn file_url(&self, repo_id: &str, path: &str) -> String {
        format!("{}/datasets/{}/resolve/main/{}", self.endpoint, repo_id, path)
    }

    pub fn commit_url(&self, repo_id: &str) -> String {
        format!("{}/api/datasets/{}/commit/main", self.endpoint, repo_id)
    }

    /// Create the dataset repository once per store; existing repos are fine.
    fn ensure_repo(&self, repo_id: &str, private: bool) -> Result<(), HubError> {
        if let Ok(created) = self.created.lock() {
            if created.contains(repo_id) {
                return Ok(());
            }
        }

        self.token()?;
        let (organization, name) = parse_repo_id(repo_id)?;
        let body = serde_json::json!({
            "type": "dataset",
            "name": name,
            "organization": organization,
            "private": private,
        });

        match self
            .request("POST", &format!("{}/api/repos/create", self.endpoint))
            .send_json(body)
        {
            Ok(_) => info!(repo_id, private, "created hub repository"),
            // 409: already exists; 400: exists with other settings
            Err(ureq::Error::Status(409, _)) | Err(ureq::Error::Status(400, _)) => {
                debug!(repo_id, "hub repository already exists")
            }
            Err(e) => return Err(e.into()),
        }

        if let Ok(mut created) = self.created.lock() {
            created.insert(repo_id.to_string());
        }
        Ok(())
    }

    fn commit_file(&self, repo_id: &str, path: &str, contents: &str) -> Result<(), HubError> {
        self.token()?;
        let header = serde_json::json!({
            "key": "header",
            "value": { "summary": format!("Upload {}", path), "description": "" },
        });
        let file = serde_json::json!({
            "key": "file",
            "value": {
                "path": path,
                "content": STANDARD.encode(contents.as_bytes()),
                "encoding": "base64",
            },
        });
        let payload = format!("{}\n{}\n", header, file);

        self.request("POST", &self.commit_url(repo_id))
            .set("Content-Type", "application/x-ndjson")
            .send_string(&payload)?;
        Ok(())
    }
}

impl ResultStore for HubStore {
    fn name(&self) -> &str {
        "hub"
    }

    fn read_file(&self, repo_id: &str, path: &str) -> Result<Option<String>> {
        match self.request("GET", &self.file_url(repo_id, path)).call() {
            Ok(resp) => Ok(Some(resp.into_string().map_err(HubError::Io)?)),
            Err(ureq::Error::Status(404, _)) => Ok(None),
            Err(e) => Err(HubError::from(e).into()),
        }
    }

    fn write_file(&self, repo_id: &str, path: &str, contents: &str, private: bool) -> Result<()> {
        self.ensure_repo(repo_id, private)?;
        self.commit_file(repo_id, path, contents)?;
        debug!(repo_id, path, "pushed file to hub");
        Ok(())
    }
}

pub fn parse_repo_id(repo_id: &str) -> Result<(&str, &str), HubError> {
    match repo_id.split_once('/') {
        Some((org, name)) if !org.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok((org, name))
        }
        _ => Err(HubError::InvalidRepoId(repo_id.to_string())),
    }
}
