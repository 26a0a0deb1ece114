//! Error types for plan generation.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("user story is empty")]
    EmptyStory,

    #[error("could not connect to the model server at {endpoint}")]
    Connection {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to the model server at {endpoint} timed out")]
    Timeout {
        endpoint: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("model '{model}' is not available: {message}")]
    Model { model: String, message: String },

    #[error("model server returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("unexpected response from model server: {0}")]
    Decode(String),

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl PlanError {
    /// Sort a transport-level failure into connection, timeout, decode or other.
    pub(crate) fn from_reqwest(err: reqwest::Error, endpoint: &str) -> Self {
        if err.is_connect() {
            Self::Connection {
                endpoint: endpoint.to_string(),
                source: err,
            }
        } else if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
                source: Some(err),
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Http(err)
        }
    }

    /// Map a non-success response to an error.
    ///
    /// Ollama answers `{"error": "..."}` on failure and uses 404 when the
    /// requested model has not been pulled.
    pub(crate) fn from_status(status: StatusCode, body: &str, model: &str) -> Self {
        let message = error_message(body);

        if status == StatusCode::NOT_FOUND || mentions_missing_model(&message) {
            Self::Model {
                model: model.to_string(),
                message,
            }
        } else {
            Self::Server {
                status: status.as_u16(),
                message,
            }
        }
    }

    /// Non-success status from an endpoint that is not about one model.
    pub(crate) fn from_server_status(status: StatusCode, body: &str) -> Self {
        Self::Server {
            status: status.as_u16(),
            message: error_message(body),
        }
    }

    /// No progress from the server within `timeout`.
    pub(crate) fn stalled(endpoint: &str) -> Self {
        Self::Timeout {
            endpoint: endpoint.to_string(),
            source: None,
        }
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}

fn mentions_missing_model(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("model") && (lower.contains("not found") || lower.contains("try pulling"))
}
