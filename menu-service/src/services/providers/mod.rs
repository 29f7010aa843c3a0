//! Upstream chat-model provider abstraction.
//!
//! The handler depends only on [`ChatProvider`], so the OpenRouter backend can
//! be swapped for a scripted mock in tests.

pub mod mock;
pub mod openrouter;

use async_trait::async_trait;
use thiserror::Error;

/// Failure kinds of one upstream call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The upstream answered with a non-success HTTP status.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The upstream could not be reached, or did not answer in time.
    #[error("connection error: {0}")]
    Connection(String),

    /// Anything else, e.g. an envelope without message content.
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// One chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System-role message.
    pub system: String,

    /// User-role message.
    pub user: String,

    /// Sampling temperature.
    pub temperature: f32,

    /// Ask the provider to constrain output to a JSON object.
    pub json_output: bool,
}

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a completion and return the text of the first choice.
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError>;

    /// Whether the provider has what it needs to serve requests.
    async fn health_check(&self) -> Result<(), ProviderError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
