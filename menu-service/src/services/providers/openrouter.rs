//! OpenRouter provider.
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint, so any
//! compatible base URL works.

use super::{ChatProvider, ChatRequest, ProviderError};
use crate::config::OpenRouterConfig;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

/// OpenRouter chat provider.
pub struct OpenRouterProvider {
    config: OpenRouterConfig,
    model: String,
    client: Client,
}

impl OpenRouterProvider {
    pub fn new(config: OpenRouterConfig, model: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unexpected(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            model: model.into(),
            client,
        })
    }

    /// Whether an API key was supplied.
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl ChatProvider for OpenRouterProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request.json_output.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        tracing::debug!(
            model = %self.model,
            prompt_len = request.user.len(),
            "Sending request to OpenRouter API"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key.expose_secret())
            .header("HTTP-Referer", &self.config.site_url)
            .header("X-Title", &self.config.app_name)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Connection(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ProviderError::Unexpected(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = envelope.error {
            return Err(ProviderError::Unexpected(format!(
                "Provider reported an error: {}",
                error.message
            )));
        }

        envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Unexpected("No message content in response".to_string()))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.is_configured() {
            Ok(())
        } else {
            Err(ProviderError::Unexpected(
                "OpenRouter API key not configured".to_string(),
            ))
        }
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn map_send_error(e: reqwest::Error) -> ProviderError {
    if e.is_builder() {
        ProviderError::Unexpected(format!("Failed to build request: {}", e))
    } else if e.is_timeout() {
        ProviderError::Connection(format!("Request timed out: {}", e))
    } else {
        ProviderError::Connection(e.to_string())
    }
}

// ============================================================================
// Chat Completions Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}
