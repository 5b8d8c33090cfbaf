//! Model invocation: the OpenAI-compatible chat-completions wire call.
//!
//! The seam between the pipeline and the network is the [`ModelClient`]
//! trait; the production implementation is [`OpenAiClient`] and tests swap in
//! a scripted mock. Requests are sent exactly once — retry policy is the
//! caller's concern, and the source behavior this crate reproduces makes a
//! single attempt per document.
//!
//! Every transport, authentication, or remote-side failure surfaces as
//! [`PipelineError::Invocation`] (or [`PipelineError::InvocationTimeout`]
//! when the configured deadline expires); the orchestrator turns those into
//! the zero-confidence error payload rather than propagating them.

use crate::config::AnalysisConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

// ── Request wire types ───────────────────────────────────────────────────

/// A chat-completions request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// One turn of the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user turn carrying an instruction plus one inlined JPEG data-URI.
    pub fn user_with_image(text: impl Into<String>, base64_jpeg: &str) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/jpeg;base64,{base64_jpeg}"),
                    },
                },
            ]),
        }
    }
}

/// Message content: plain string for text turns, typed parts for multimodal
/// turns. `untagged` yields exactly the two JSON shapes the API accepts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

// ── Response wire types ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ── Client seam ──────────────────────────────────────────────────────────

/// The pipeline's only external dependency: something that turns a
/// [`ChatRequest`] into raw reply text.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send one request and return the model's raw reply text.
    async fn complete(&self, request: ChatRequest) -> Result<String, PipelineError>;
}

/// `reqwest`-backed client for OpenAI-compatible endpoints (OpenRouter,
/// OpenAI, local gateways).
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Build a client from the analysis configuration.
    ///
    /// The per-call deadline is baked into the HTTP client so every request
    /// through it is bounded.
    pub fn new(config: &AnalysisConfig) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| {
                PipelineError::InvalidConfig(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            "Initialized model client: url={}, vision={}, text={}",
            config.base_url, config.vision_model, config.text_model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout_secs: config.api_timeout_secs,
        })
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, PipelineError> {
        debug!(
            "Invoking model {} with {} messages",
            request.model,
            request.messages.len()
        );

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self.client.post(&url).json(&request);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                PipelineError::InvocationTimeout {
                    secs: self.timeout_secs,
                }
            } else {
                PipelineError::Invocation {
                    detail: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ApiErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(PipelineError::Invocation {
                detail: format!("endpoint returned {status}: {message}"),
            });
        }

        let result: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| PipelineError::Invocation {
                    detail: format!("failed to parse response: {e}"),
                })?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PipelineError::Invocation {
                detail: "reply contained no choices".to_string(),
            })?;

        debug!("Model reply: {} chars", content.len());
        Ok(content)
    }
}
