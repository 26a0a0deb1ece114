//! Story in, test plan out.

use tracing::{info, warn};

use crate::config::Config;
use crate::error::PlanError;
use crate::ollama::{GenerateRequest, OllamaClient, PullStatus};
use crate::prompt::{Prompt, build_prompt};

/// Outcome of [`StoryToPlanInvoker::ensure_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelStatus {
    Available,
    Pulled { digest: Option<String> },
}

pub struct StoryToPlanInvoker {
    client: OllamaClient,
    config: Config,
}

impl StoryToPlanInvoker {
    pub fn new(config: Config) -> Result<Self, PlanError> {
        let client = OllamaClient::new(&config.endpoint, config.timeout, config.connect_timeout)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Make sure the configured model is present on the server, pulling it
    /// when `pull_missing` is set.
    pub async fn ensure_model(&self) -> Result<ModelStatus, PlanError> {
        let model = &self.config.model;
        let local = self.client.list_models().await?;

        if local.iter().any(|m| model_matches(&m.name, model)) {
            info!(%model, "model is available locally");
            return Ok(ModelStatus::Available);
        }

        if !self.config.pull_missing {
            return Err(PlanError::Model {
                model: model.clone(),
                message: "not present on the server and pulling is disabled".to_string(),
            });
        }

        warn!(%model, "model not found locally, pulling");
        let mut progress = PullProgress::default();
        let digest = self.client.pull(model, |s| progress.observe(s)).await?;
        info!(%model, digest = digest.as_deref().unwrap_or("-"), "model pulled");

        Ok(ModelStatus::Pulled { digest })
    }

    /// Build the prompt for `story` and send it.
    pub async fn generate(&self, story: &str) -> Result<String, PlanError> {
        let prompt = build_prompt(story)?;
        self.send(&prompt).await
    }

    /// One generate call. The model's text is returned unmodified.
    pub async fn send(&self, prompt: &Prompt) -> Result<String, PlanError> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: prompt.text.clone(),
            system: Some(prompt.system.clone()),
            stream: false,
        };

        info!(model = %self.config.model, endpoint = %self.client.endpoint(), "generating test plan");
        let response = self.client.generate(&request).await?;
        Ok(response.response)
    }
}

/// Generate a BDD test plan for `story` with `model_name` served at `endpoint`.
pub async fn generate_plan(story: &str, model_name: &str, endpoint: &str) -> Result<String, PlanError> {
    let config = Config::default()
        .with_model(model_name)
        .with_endpoint(endpoint);
    StoryToPlanInvoker::new(config)?.generate(story).await
}

/// `phi3` on the command line refers to `phi3:latest` on the server.
pub fn model_matches(local: &str, wanted: &str) -> bool {
    if local == wanted {
        return true;
    }
    !wanted.contains(':') && local.strip_suffix(":latest") == Some(wanted)
}

#[derive(Default)]
struct PullProgress {
    last_status: String,
    last_decile: Option<u64>,
}

impl PullProgress {
    fn observe(&mut self, s: &PullStatus) {
        if s.status != self.last_status {
            info!(status = %s.status, "pull");
            self.last_status = s.status.clone();
            self.last_decile = None;
        }

        if let (Some(total), Some(completed)) = (s.total, s.completed) {
            if total == 0 {
                return;
            }
            let decile = completed.min(total) * 10 / total;
            if self.last_decile != Some(decile) {
                info!(completed, total, "{}%", decile * 10);
                self.last_decile = Some(decile);
            }
        }
    }
}
