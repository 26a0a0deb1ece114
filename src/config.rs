//! Runtime configuration for the plan agent.
//!
//! Values are resolved by the CLI in the order flag > env var > default.

use std::time::Duration;

pub const DEFAULT_MODEL: &str = "phi3:mini";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Model name as known to the server, e.g. `phi3:mini`.
    pub model: String,
    /// Base URL of the model server.
    pub endpoint: String,
    /// Upper bound for a single generate or list request.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Pull the model when the server does not have it yet.
    pub pull_missing: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            pull_missing: true,
        }
    }
}

impl Config {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Self {
        self.endpoint = normalize_endpoint(endpoint.as_ref());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_pull_missing(mut self, pull: bool) -> Self {
        self.pull_missing = pull;
        self
    }
}

/// Accept `OLLAMA_HOST` style values such as `127.0.0.1:11434`.
pub fn normalize_endpoint(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return DEFAULT_ENDPOINT.to_string();
    }
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}
