//! Mock provider implementation for testing.

use super::{ChatProvider, ChatRequest, ProviderError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Returns a fixed result and records what it was asked.
pub struct MockChatProvider {
    result: Result<String, ProviderError>,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockChatProvider {
    /// Answer every call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_result(Ok(text.into()))
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_result(Err(error))
    }

    pub fn with_result(result: Result<String, ProviderError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of completions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or(None)
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut guard) = self.last_request.lock() {
            *guard = Some(request.clone());
        }
        self.result.clone()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
