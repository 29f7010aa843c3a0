//! Application startup and lifecycle management.

use crate::config::MenuConfig;
use crate::handlers::{
    self,
    health::{health_check, readiness_check},
    menu::generate_menu,
};
use crate::prompts::PromptTemplate;
use crate::services::providers::openrouter::OpenRouterProvider;
use crate::services::ChatProvider;
use axum::handler::HandlerWithoutStateExt;
use axum::middleware::from_fn;
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn ChatProvider>,
    pub prompts: PromptTemplate,
}

impl AppState {
    pub fn new(provider: Arc<dyn ChatProvider>, prompts: PromptTemplate) -> Self {
        Self { provider, prompts }
    }
}

/// Build the HTTP router: API routes, then the static front-end, then a JSON 404.
pub fn build_router(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    let static_dir = static_dir.as_ref();
    let static_files =
        ServeDir::new(static_dir).not_found_service(handlers::not_found.into_service());

    Router::new()
        .route("/generate_menu", post(generate_menu))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .fallback_service(static_files)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the OpenRouter provider.
    pub async fn build(config: MenuConfig) -> Result<Self, AppError> {
        let provider = OpenRouterProvider::new(
            config.openrouter.clone(),
            config.models.chat_model.clone(),
        )
        .map_err(|e| AppError::InternalError(anyhow::anyhow!(e)))?;

        if provider.is_configured() {
            tracing::info!(
                model = %config.models.chat_model,
                base_url = %config.openrouter.base_url,
                "Initialized OpenRouter provider"
            );
        } else {
            tracing::warn!(
                "OPENROUTER_API_KEY is not set - menu generation requests will fail upstream"
            );
        }

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: MenuConfig,
        provider: Arc<dyn ChatProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(provider, PromptTemplate::new(config.menu.schema));
        let router = build_router(state, &config.menu.static_dir);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            schema = %config.menu.schema,
            "Menu service listening on port {}",
            port
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until SIGINT/SIGTERM.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
