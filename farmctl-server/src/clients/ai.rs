//! Chat-completion client for insight generation
//!
//! Speaks the OpenAI-compatible `/chat/completions` API and asks for a JSON
//! object reply. The raw text is returned; parsing and normalization happen
//! in `farmctl_core::insight`.

use std::time::Duration;

use async_trait::async_trait;
use farmctl_core::Prompt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AiSettings;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI provider is not configured (OPENAI_API_KEY not set)")]
    NotConfigured,

    #[error("AI request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("AI provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("AI provider returned no content")]
    EmptyResponse,
}

/// Anything that can turn a prompt into model text
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Returns the model's text reply.
    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError>;

    /// Model identifier recorded in insight metadata
    fn model(&self) -> &str;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI-compatible chat-completion client
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    const TEMPERATURE: f32 = 0.4;

    pub fn new(settings: &AiSettings) -> Result<Self, AiError> {
        let api_key = settings
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(AiError::NotConfigured)?
            .to_string();

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(concat!("farmctl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl InsightGenerator for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
            temperature: Self::TEMPERATURE,
        };

        tracing::debug!(model = %self.model, "Requesting chat completion");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Stand-in used when no API key is configured; every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredGenerator;

#[async_trait]
impl InsightGenerator for UnconfiguredGenerator {
    async fn complete(&self, _prompt: &Prompt) -> Result<String, AiError> {
        Err(AiError::NotConfigured)
    }

    fn model(&self) -> &str {
        "none"
    }
}
