use axum::{
    extract::rejection::JsonRejection,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::{Deserialize, IgnoredAny};
use serde_json::Value;
use std::time::Instant;

use crate::error::MenuError;
use crate::models::MenuRequest;
use crate::services::{metrics, ChatRequest, ProviderError};
use crate::startup::AppState;

/// Sampling temperature for menu generation.
pub const MENU_TEMPERATURE: f32 = 0.7;

/// `POST /generate_menu`: build the prompt, ask the model, relay its JSON.
///
/// The model's text is checked for JSON validity and then returned byte for
/// byte, so numbers, key order and nesting are never rewritten.
#[tracing::instrument(skip(state, payload))]
pub async fn generate_menu(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, MenuError> {
    tracing::info!("'/generate_menu' endpoint called");

    let result = handle(&state, payload).await;
    match &result {
        Ok(_) => metrics::record_generation("success"),
        Err(e) => metrics::record_generation(e.outcome()),
    }
    result.map(|menu| ([(header::CONTENT_TYPE, "application/json")], menu).into_response())
}

async fn handle(
    state: &AppState,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<String, MenuError> {
    let request = payload
        .map_err(|rejection| rejection.body_text())
        .and_then(|Json(body)| MenuRequest::from_value(body))
        .map_err(|reason| {
            tracing::warn!(%reason, "Invalid request: ingredients missing or not a list");
            MenuError::ClientValidation(reason)
        })?;

    let chat = ChatRequest {
        system: state.prompts.system_prompt().to_string(),
        user: state.prompts.user_prompt(&request),
        temperature: MENU_TEMPERATURE,
        json_output: true,
    };

    let model = state.provider.model().to_string();
    tracing::info!(model = %model, schema = %state.prompts.schema(), "Requesting menu from upstream model");

    let started = Instant::now();
    let completion = state.provider.complete(&chat).await;
    metrics::record_upstream_latency(&model, started.elapsed().as_secs_f64());

    let text = completion.map_err(|e| {
        match &e {
            ProviderError::Status { status, body } => {
                tracing::error!(status, response = %body, "Upstream model API error")
            }
            ProviderError::Connection(msg) => {
                tracing::error!(error = %msg, "Failed to connect to upstream model API")
            }
            ProviderError::Unexpected(msg) => {
                tracing::error!(error = %msg, "Unexpected error while generating menu")
            }
        }
        MenuError::from(e)
    })?;

    if let Err(e) = validate_json(&text) {
        tracing::error!(error = %e, raw = %text, "Failed to parse JSON from AI response");
        return Err(MenuError::ResponseFormat { raw: text });
    }

    tracing::info!("Successfully generated menu");
    Ok(text)
}

/// Check that `text` is one complete JSON document, at any nesting depth.
fn validate_json(text: &str) -> Result<(), serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    IgnoredAny::deserialize(&mut deserializer)?;
    deserializer.end()
}
