//! Chat-completion client.

use crate::config::ExplainOptions;
use crate::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A backend able to answer a prompt.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send a system message and a user prompt, returning the answer text.
    ///
    /// # Errors
    ///
    /// Returns an `Http` error if the request fails or the response carries
    /// no answer.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    /// Create a client from explanation options and an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(options: &ExplainOptions, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .user_agent(concat!("infraexplain/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                crate::err!(Http {
                    message: format!("failed to create HTTP client: {e}"),
                    status_code: None,
                })
            })?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            endpoint: options.endpoint.clone(),
            model: options.model.clone(),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "Sending completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("request failed: {e}")
                };
                crate::err!(Http { message, status_code: None })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(crate::err!(Http {
                message: format!("API error: {} - {}", status.as_u16(), body),
                status_code: Some(status.as_u16()),
            }));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            crate::err!(Http {
                message: format!("invalid API response: {e}"),
                status_code: Some(status.as_u16()),
            })
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| {
                crate::err!(Http {
                    message: "no response from API".to_string(),
                    status_code: Some(status.as_u16()),
                })
            })
    }
}
