//! Error type of the `/generate_menu` endpoint.

use crate::services::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    /// Missing or malformed request body.
    #[error("Invalid request: {0}")]
    ClientValidation(String),

    /// Upstream rejected the call; its status is forwarded.
    #[error("Upstream model API error: {status} {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Upstream could not be reached.
    #[error("Failed to connect to upstream model API: {0}")]
    UpstreamConnectivity(String),

    /// Model output was not valid JSON.
    #[error("AI response was not valid JSON despite requesting JSON format.")]
    ResponseFormat { raw: String },

    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

impl MenuError {
    pub fn status(&self) -> StatusCode {
        match self {
            MenuError::ClientValidation(_) => StatusCode::BAD_REQUEST,
            MenuError::UpstreamStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            MenuError::UpstreamConnectivity(_) => StatusCode::SERVICE_UNAVAILABLE,
            MenuError::ResponseFormat { .. } | MenuError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Label for `menu_generations_total`.
    pub fn outcome(&self) -> &'static str {
        match self {
            MenuError::ClientValidation(_) => "rejected",
            MenuError::UpstreamStatus { .. } => "upstream_status",
            MenuError::UpstreamConnectivity(_) => "upstream_connectivity",
            MenuError::ResponseFormat { .. } => "invalid_json",
            MenuError::Internal(_) => "internal",
        }
    }
}

impl From<ProviderError> for MenuError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Status { status, body } => MenuError::UpstreamStatus { status, body },
            ProviderError::Connection(msg) => MenuError::UpstreamConnectivity(msg),
            ProviderError::Unexpected(msg) => MenuError::Internal(msg),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl IntoResponse for MenuError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = match self {
            MenuError::ClientValidation(_) => ErrorResponse {
                error: "ingredients are required and must be a non-empty list of strings."
                    .to_string(),
                raw: None,
            },
            MenuError::ResponseFormat { raw } => ErrorResponse {
                error: message,
                raw: Some(raw),
            },
            // Detail is logged by the handler, not returned.
            MenuError::Internal(_) => ErrorResponse {
                error: "An unexpected internal error occurred.".to_string(),
                raw: None,
            },
            _ => ErrorResponse {
                error: message,
                raw: None,
            },
        };

        (status, Json(body)).into_response()
    }
}
