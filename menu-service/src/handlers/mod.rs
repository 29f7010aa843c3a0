//! HTTP handlers for the menu service.

pub mod health;
pub mod menu;

use axum::response::IntoResponse;
use service_core::error::AppError;

pub async fn metrics() -> impl IntoResponse {
    crate::services::metrics::get_metrics()
}

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("route not found"))
}
