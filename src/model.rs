use std::{future::Future, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GatewayConfig;

/// Body of one generate call to the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelQuery {
    pub model: String,
    pub prompt: String,
    /// Base64 images in prompt order: wireframe first, webpage second.
    pub images: Vec<String>,
    pub stream: bool,
}

impl ModelQuery {
    /// Builds a non-streaming query from the configured model and prompt.
    pub fn new(config: &GatewayConfig, wireframe_b64: String, webpage_b64: String) -> Self {
        Self {
            model: config.model.clone(),
            prompt: config.prompt.clone(),
            images: vec![wireframe_b64, webpage_b64],
            stream: false,
        }
    }
}

/// Successful answer of the vision model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelReply {
    pub status: u16,
    pub response: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Failure of a model call. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The service answered with a non-success status code.
    #[error("Ollama API error: {0}")]
    Status(u16),
    /// The call could not complete: timeout, connection or decoding fault.
    #[error("Ollama analysis failed: {0}")]
    Transport(String),
    /// The HTTP client could not be built from the configuration.
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

impl ModelError {
    fn transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ModelError::Transport(format!(
                "request timed out after {}s: {err}",
                timeout.as_secs_f32()
            ))
        } else {
            ModelError::Transport(err.to_string())
        }
    }
}

/// Trait for the multimodal service the gateway forwards comparisons to.
///
/// The gateway holds one implementation for its whole lifetime and calls it
/// concurrently from every request, so implementations must not keep
/// per-request state.
pub trait VisionModel: Send + Sync + 'static {
    /// Runs a single generate call and returns the model's free-text reply.
    fn generate(
        &self,
        query: ModelQuery,
    ) -> impl Future<Output = Result<ModelReply, ModelError>> + Send;
}

/// Client for the `/api/generate` endpoint of an Ollama server.
pub struct OllamaModel {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl OllamaModel {
    pub fn new(config: &GatewayConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: config.ollama_url.clone(),
            timeout: config.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl VisionModel for OllamaModel {
    async fn generate(&self, query: ModelQuery) -> Result<ModelReply, ModelError> {
        log::debug!("Sending generate request to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .json(&query)
            .send()
            .await
            .map_err(|e| ModelError::transport(e, self.timeout))?;

        let status = response.status();
        if !status.is_success() {
            log::error!("Model service answered {status}");
            return Err(ModelError::Status(status.as_u16()));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::transport(e, self.timeout))?;

        Ok(ModelReply {
            status: status.as_u16(),
            response: body.response,
        })
    }
}
