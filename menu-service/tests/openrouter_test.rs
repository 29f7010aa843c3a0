mod common;

use common::{test_config, TestApp, TEST_API_KEY, TEST_APP_NAME, TEST_MODEL, TEST_SITE_URL};
use menu_service::services::providers::openrouter::OpenRouterProvider;
use menu_service::services::{ChatProvider, ChatRequest, ProviderError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MENU_JSON: &str = r#"{"menu_title":"x","dishes":[],"total_calories":0,"notes":"n"}"#;

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "gen-123",
        "model": TEST_MODEL,
        "choices": [{
            "index": 0,
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": content}
        }]
    })
}

fn chat_request() -> ChatRequest {
    ChatRequest {
        system: "You are a dietitian.".to_string(),
        user: "Ingredients: [\"egg\"]".to_string(),
        temperature: 0.7,
        json_output: true,
    }
}

fn provider_for(server: &MockServer) -> OpenRouterProvider {
    let config = test_config(&format!("{}/api/v1", server.uri()));
    OpenRouterProvider::new(config.openrouter, TEST_MODEL).expect("Failed to build provider")
}

#[tokio::test]
async fn sends_chat_completion_in_json_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .and(header("authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .and(header("http-referer", TEST_SITE_URL))
        .and(header("x-title", TEST_APP_NAME))
        .and(body_partial_json(json!({
            "model": TEST_MODEL,
            "temperature": 0.7,
            "response_format": {"type": "json_object"},
            "messages": [
                {"role": "system", "content": "You are a dietitian."},
                {"role": "user", "content": "Ingredients: [\"egg\"]"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(MENU_JSON)))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider_for(&server)
        .complete(&chat_request())
        .await
        .expect("completion failed");

    assert_eq!(text, MENU_JSON);
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&chat_request())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ProviderError::Status {
            status: 429,
            body: "slow down".to_string()
        }
    );
}

#[tokio::test]
async fn missing_content_is_unexpected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(&chat_request())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Unexpected(_)));
}

#[tokio::test]
async fn unreachable_upstream_is_a_connection_error() {
    let config = test_config("http://127.0.0.1:1/api/v1");
    let provider = OpenRouterProvider::new(config.openrouter, TEST_MODEL).unwrap();

    let err = provider.complete(&chat_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Connection(_)));
}

#[tokio::test]
async fn slow_upstream_times_out_as_connection_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(MENU_JSON))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut config = test_config(&format!("{}/api/v1", server.uri()));
    config.openrouter.timeout = Duration::from_millis(200);
    let provider = OpenRouterProvider::new(config.openrouter, TEST_MODEL).unwrap();

    let err = provider.complete(&chat_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::Connection(_)));
}

#[tokio::test]
async fn readiness_requires_api_key() {
    let mut config = test_config("http://127.0.0.1:1/api/v1");
    config.openrouter.api_key = secrecy::Secret::new(String::new());
    let provider = OpenRouterProvider::new(config.openrouter, TEST_MODEL).unwrap();

    assert!(!provider.is_configured());
    assert!(provider.health_check().await.is_err());
}

#[tokio::test]
async fn end_to_end_menu_generation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(MENU_JSON)))
        .expect(1)
        .mount(&server)
        .await;

    let app = TestApp::spawn(&format!("{}/api/v1", server.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{}/generate_menu", app.address))
        .json(&json!({"ingredients": ["potato", "onion", "chicken"], "budget": 500}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), MENU_JSON);
}

#[tokio::test]
async fn end_to_end_upstream_unauthorized_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"error":{"message":"No auth credentials found"}}"#),
        )
        .mount(&server)
        .await;

    let app = TestApp::spawn(&format!("{}/api/v1", server.uri())).await;

    let response = reqwest::Client::new()
        .post(format!("{}/generate_menu", app.address))
        .json(&json!({"ingredients": ["egg"]}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("401"));
    assert!(error.contains("No auth credentials found"));
}
