//! Gemini client and backend against a mocked Generative Language API.

use std::sync::Arc;

use serde_json::{json, Value};
use sticker_studio::config::GeminiConfig;
use sticker_studio::core::credentials::{CredentialStore, MemoryCredentialStore};
use sticker_studio::core::gemini::{GeminiBackend, GeminiClient, GenerationError, StickerBackend};
use sticker_studio::core::prompt::{sticker_prompt, style_instruction};
use sticker_studio::core::sticker::{placeholder_pixels, StickerImage};
use wiremock::matchers::{any, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "AIzaSyIntegrationTestKey01";
const IMAGE_PATH: &str = "/models/test-image-model:generateContent";
const TEXT_PATH: &str = "/models/test-text-model:generateContent";

fn config(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        base_url: server.uri(),
        image_model: "test-image-model".to_string(),
        text_model: "test-text-model".to_string(),
        timeout_secs: 5,
    }
}

fn backend(server: &MockServer, key: Option<&str>) -> GeminiBackend {
    let client = GeminiClient::new(&config(server)).expect("client");
    let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::with_key(key));
    GeminiBackend::new(client, credentials)
}

fn sample_png() -> StickerImage {
    StickerImage::from_rgba(&placeholder_pixels(8)).expect("png")
}

fn image_response(image: &StickerImage) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "Here is your sticker" },
                { "inlineData": { "mimeType": image.mime_type(), "data": image.to_base64() } }
            ]}
        }]
    })
}

fn text_response(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[tokio::test]
async fn test_generate_sends_key_prompt_and_modality() {
    let server = MockServer::start().await;
    let png = sample_png();

    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": sticker_prompt("a dancing taco") }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response(&png)))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server, Some(KEY))
        .generate_sticker("a dancing taco")
        .await
        .unwrap();

    assert_eq!(result.image, png);
    assert_eq!(result.full_prompt, sticker_prompt("a dancing taco"));
    assert!(result.image.decode().is_ok());
}

#[tokio::test]
async fn test_missing_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend(&server, None);
    let err = backend.generate_sticker("anything").await.unwrap_err();
    assert!(err.is_missing_credential());

    let err = backend.suggest_idea().await.unwrap_err();
    assert!(err.is_missing_credential());
}

#[tokio::test]
async fn test_blocked_prompt_is_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = backend(&server, Some(KEY))
        .generate_sticker("something")
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::ExternalService { .. }));
    let message = err.to_string();
    assert!(message.starts_with("Failed to generate image: "));
    assert!(message.contains("blocked"));
}

#[tokio::test]
async fn test_text_only_reply_is_external_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("I can't draw that")))
        .mount(&server)
        .await;

    let err = backend(&server, Some(KEY))
        .generate_sticker("something")
        .await
        .unwrap_err();

    assert!(matches!(err, GenerationError::ExternalService { status: None, .. }));
    assert!(err.to_string().contains("No image data"));
}

#[tokio::test]
async fn test_http_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let err = backend(&server, Some(KEY))
        .generate_sticker("something")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(403));
    let message = err.to_string();
    assert!(message.starts_with("Failed to generate image: API error 403"));
    assert!(message.contains("API key not valid"));
}

#[tokio::test]
async fn test_edit_sends_inline_image_and_instruction() {
    let server = MockServer::start().await;
    let source = sample_png();
    let edited = StickerImage::from_rgba(&placeholder_pixels(12)).unwrap();
    let instruction = style_instruction("watercolor");

    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [
                { "inlineData": { "mimeType": "image/png", "data": source.to_base64() } },
                { "text": instruction }
            ]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_response(&edited)))
        .expect(1)
        .mount(&server)
        .await;

    let result = backend(&server, Some(KEY))
        .edit_image(&source, &instruction)
        .await
        .unwrap();

    assert_eq!(result.image, edited);
    assert_eq!(result.full_prompt, instruction);
}

#[tokio::test]
async fn test_edit_failure_is_prefixed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = backend(&server, Some(KEY))
        .edit_image(&sample_png(), "add a hat")
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to edit image: "));
}

#[tokio::test]
async fn test_idea_uses_schema_and_parses_fields() {
    let server = MockServer::start().await;
    let idea = json!({
        "who": "a grumpy cloud",
        "what": "raining on a picnic",
        "when": "a summer afternoon",
        "where": "a city park",
        "style": "flat vector sticker"
    });

    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(header("x-goog-api-key", KEY))
        .and(body_partial_json(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&idea.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let fields = backend(&server, Some(KEY)).suggest_idea().await.unwrap();
    assert_eq!(fields.who, "a grumpy cloud");
    assert_eq!(fields.r#where, "a city park");
    assert_eq!(
        fields.combine(),
        "a grumpy cloud, raining on a picnic, a summer afternoon, a city park, flat vector sticker"
    );
}

#[tokio::test]
async fn test_idea_missing_field_is_schema_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(text_response(r#"{"who":"a fox","what":"jumping"}"#)),
        )
        .mount(&server)
        .await;

    let err = backend(&server, Some(KEY)).suggest_idea().await.unwrap_err();
    assert!(matches!(err, GenerationError::Schema(_)));
    assert!(err.to_string().contains("Unexpected idea format"));
}

#[tokio::test]
async fn test_unreachable_host_is_prefixed_network_error() {
    // Bind then drop to get a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = GeminiConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        image_model: "test-image-model".to_string(),
        text_model: "test-text-model".to_string(),
        timeout_secs: 5,
    };
    let client = GeminiClient::new(&config).unwrap();
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(MemoryCredentialStore::with_key(Some(KEY)));
    let backend = GeminiBackend::new(client, credentials);

    let err = backend.generate_sticker("a lost kite").await.unwrap_err();

    match err {
        GenerationError::Network(message) => {
            assert!(message.starts_with("Failed to generate image: "), "{message}");
        }
        other => panic!("expected a network error, got {other:?}"),
    }
}
