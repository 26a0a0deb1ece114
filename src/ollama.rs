//! Thin typed client for the Ollama HTTP API.

use std::time::Duration;

use futures::prelude::*;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::debug;

use crate::error::PlanError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    model: &'a str,
    stream: bool,
}

/// One line of the NDJSON stream returned by `/api/pull`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PullStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub completed: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: Client,
    base: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(endpoint: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self, PlanError> {
        let url = Url::parse(endpoint).map_err(|e| PlanError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlanError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        // Generate and list set a total timeout per request. Pull bounds
        // each wait for the next chunk instead.
        let http = Client::builder().connect_timeout(connect_timeout).build()?;

        Ok(Self {
            http,
            base: endpoint.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    /// Non-streaming completion. The `response` text is returned as sent.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, PlanError> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "POST /api/generate");

        let res = self
            .http
            .post(self.url("api/generate"))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| PlanError::from_reqwest(e, &self.base))?;

        let res = check(res, &request.model).await?;
        res.json::<GenerateResponse>()
            .await
            .map_err(|e| PlanError::from_reqwest(e, &self.base))
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, PlanError> {
        debug!("GET /api/tags");

        let res = self
            .http
            .get(self.url("api/tags"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| PlanError::from_reqwest(e, &self.base))?;

        let status = res.status();
        if !status.is_success() {
            let body = error_body(res).await;
            return Err(PlanError::from_server_status(status, &body));
        }
        let tags: TagsResponse = res
            .json()
            .await
            .map_err(|e| PlanError::from_reqwest(e, &self.base))?;
        Ok(tags.models)
    }

    /// Pull `model`, reporting each progress line. Returns the last digest seen.
    ///
    /// The download may take as long as it needs, but every wait for the
    /// response head or the next chunk is bounded by the request timeout.
    pub async fn pull<F>(&self, model: &str, mut on_progress: F) -> Result<Option<String>, PlanError>
    where
        F: FnMut(&PullStatus),
    {
        debug!(%model, "POST /api/pull");

        let send = self
            .http
            .post(self.url("api/pull"))
            .json(&PullRequest { model, stream: true })
            .send();
        let res = time::timeout(self.timeout, send)
            .await
            .map_err(|_| PlanError::stalled(&self.base))?
            .map_err(|e| PlanError::from_reqwest(e, &self.base))?;
        let res = check(res, model).await?;

        let mut digest = None;
        let mut buf: Vec<u8> = Vec::new();
        let mut chunks = res.bytes_stream();

        while let Some(chunk) = time::timeout(self.timeout, chunks.next())
            .await
            .map_err(|_| PlanError::stalled(&self.base))?
        {
            let chunk = chunk.map_err(|e| PlanError::from_reqwest(e, &self.base))?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                apply_pull_line(&line, model, &mut digest, &mut on_progress)?;
            }
        }
        apply_pull_line(&buf, model, &mut digest, &mut on_progress)?;

        Ok(digest)
    }
}

async fn check(res: Response, model: &str) -> Result<Response, PlanError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = error_body(res).await;
    Err(PlanError::from_status(status, &body, model))
}

async fn error_body(res: Response) -> String {
    describe_body(res.text().await)
}

fn describe_body(read: Result<String, reqwest::Error>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "failed to read error body");
            format!("<unreadable response body: {e}>")
        }
    }
}

fn apply_pull_line<F>(
    line: &[u8],
    model: &str,
    digest: &mut Option<String>,
    on_progress: &mut F,
) -> Result<(), PlanError>
where
    F: FnMut(&PullStatus),
{
    let line = line.trim_ascii();
    if line.is_empty() {
        return Ok(());
    }

    let status: PullStatus = serde_json::from_slice(line)
        .map_err(|e| PlanError::Decode(format!("bad pull progress line: {e}")))?;

    if let Some(error) = status.error {
        return Err(PlanError::Model {
            model: model.to_string(),
            message: error,
        });
    }
    if let Some(d) = status.digest.as_ref().filter(|d| !d.is_empty()) {
        *digest = Some(d.clone());
    }
    on_progress(&status);
    Ok(())
}
