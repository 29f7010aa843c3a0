#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use http_body_util::BodyExt;
use menu_service::config::{MenuConfig, MenuSettings, ModelConfig, OpenRouterConfig};
use menu_service::prompts::{MenuSchema, PromptTemplate};
use menu_service::services::ChatProvider;
use menu_service::startup::{build_router, AppState, Application};
use secrecy::Secret;
use service_core::config::Config;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "openai/gpt-4o-mini";
pub const TEST_SITE_URL: &str = "http://localhost:5000";
pub const TEST_APP_NAME: &str = "MenuAdvisorTest";

pub fn static_dir() -> String {
    format!("{}/static", env!("CARGO_MANIFEST_DIR"))
}

pub fn test_config(base_url: &str) -> MenuConfig {
    MenuConfig {
        common: Config { port: 0 },
        openrouter: OpenRouterConfig {
            api_key: Secret::new(TEST_API_KEY.to_string()),
            base_url: base_url.to_string(),
            site_url: TEST_SITE_URL.to_string(),
            app_name: TEST_APP_NAME.to_string(),
            timeout: Duration::from_secs(5),
        },
        models: ModelConfig {
            chat_model: TEST_MODEL.to_string(),
        },
        menu: MenuSettings {
            schema: MenuSchema::DualPlan,
            static_dir: static_dir(),
        },
    }
}

/// Router wired to the given provider, for `oneshot` tests.
pub fn test_router(provider: Arc<dyn ChatProvider>) -> axum::Router {
    build_router(
        AppState::new(provider, PromptTemplate::new(MenuSchema::DualPlan)),
        static_dir(),
    )
}

pub fn generate_menu_request(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/generate_menu")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).expect("response body is not JSON")
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Serve the real application on a random port, talking to `base_url`.
    pub async fn spawn(base_url: &str) -> Self {
        let app = Application::build(test_config(base_url))
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    /// Serve the application around an injected provider.
    pub async fn spawn_with_provider(provider: Arc<dyn ChatProvider>) -> Self {
        let app = Application::build_with_provider(test_config("http://127.0.0.1:1"), provider)
            .await
            .expect("Failed to build test application");
        Self::run(app).await
    }

    async fn run(app: Application) -> Self {
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to accept connections
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        TestApp { address, port }
    }
}
