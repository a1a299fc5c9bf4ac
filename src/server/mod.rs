//! Sticker Proxy Service
//!
//! Single-action HTTP endpoint that forwards sticker requests to Gemini with
//! a server-held API key, so browser or script clients never see the key.
//!
//! ## Endpoints
//! - `POST /api/gemini` - `{ "action": ..., "payload": {...} }`
//! - `GET /health` - Health check
//!
//! ## Actions
//! - `generateSticker` `{ prompt }` -> `{ imageUrl, fullPrompt }`
//! - `editImage` `{ base64ImageDataUrl, prompt }` -> `{ imageUrl }`
//! - `generateIdea` `{}` -> `{ who, what, when, where, style }`

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Json, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::core::credentials::{CredentialStore, MemoryCredentialStore};
use crate::core::gemini::{GeminiBackend, GeminiClient, GenerationError, StickerBackend};
use crate::core::sticker::StickerImage;

const NOT_CONFIGURED: &str = "API Key is not configured on the server.";
const INVALID_DATA_URL: &str = "Invalid image data URL provided.";

/// Shared state for the proxy service
pub struct ServerState {
    pub backend: Arc<dyn StickerBackend>,
    /// Consulted before the body is read; the backend holds its own handle.
    pub credentials: Arc<dyn CredentialStore>,
}

impl ServerState {
    pub fn new(backend: Arc<dyn StickerBackend>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            backend,
            credentials,
        }
    }

    /// Gemini-backed state with the key taken from `config.server.api_key`.
    pub fn from_config(config: &AppConfig) -> Result<Self, GenerationError> {
        let credentials: Arc<dyn CredentialStore> = Arc::new(MemoryCredentialStore::with_key(
            config.server.api_key.as_deref(),
        ));
        let client = GeminiClient::new(&config.gemini)?;
        let backend = Arc::new(GeminiBackend::new(client, credentials.clone()));
        Ok(Self::new(backend, credentials))
    }
}

#[derive(Debug, Deserialize)]
struct ActionRequest {
    action: String,
    #[serde(default)]
    payload: Value,
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/gemini", any(gemini_action))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(ServerState::from_config(config)?);
    if !state.credentials.has_key() {
        log::warn!("No API key configured; /api/gemini will answer 500 until one is set");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Sticker proxy listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            log::info!("Sticker proxy shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// HTTP Handlers
// ============================================================================

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn gemini_action(
    State(state): State<Arc<ServerState>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return error_json(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    if !state.credentials.has_key() {
        return error_json(StatusCode::INTERNAL_SERVER_ERROR, NOT_CONFIGURED);
    }

    let request: ActionRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_json(
                StatusCode::BAD_REQUEST,
                &format!("Invalid request body: {}", e),
            )
        }
    };

    let result = match request.action.as_str() {
        "generateSticker" => generate_sticker(&state, &request.payload).await,
        "editImage" => edit_image(&state, &request.payload).await,
        "generateIdea" => generate_idea(&state).await,
        _ => return error_json(StatusCode::BAD_REQUEST, "Invalid action specified."),
    };

    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(response) => {
            log::error!("Error in action '{}'", request.action);
            response
        }
    }
}

fn payload_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

async fn generate_sticker(state: &ServerState, payload: &Value) -> Result<Value, Response> {
    let prompt = payload_str(payload, "prompt")
        .ok_or_else(|| error_json(StatusCode::BAD_REQUEST, "Prompt is required."))?;

    let result = state
        .backend
        .generate_sticker(prompt)
        .await
        .map_err(generation_error_response)?;

    Ok(json!({
        "imageUrl": result.image.to_data_url(),
        "fullPrompt": result.full_prompt,
    }))
}

async fn edit_image(state: &ServerState, payload: &Value) -> Result<Value, Response> {
    let (data_url, prompt) = match (
        payload_str(payload, "base64ImageDataUrl"),
        payload_str(payload, "prompt"),
    ) {
        (Some(d), Some(p)) => (d, p),
        _ => {
            return Err(error_json(
                StatusCode::BAD_REQUEST,
                "Image data and prompt are required.",
            ))
        }
    };

    let image = StickerImage::from_data_url(data_url)
        .map_err(|_| error_json(StatusCode::INTERNAL_SERVER_ERROR, INVALID_DATA_URL))?;

    let result = state
        .backend
        .edit_image(&image, prompt)
        .await
        .map_err(generation_error_response)?;

    Ok(json!({ "imageUrl": result.image.to_data_url() }))
}

async fn generate_idea(state: &ServerState) -> Result<Value, Response> {
    let idea = state
        .backend
        .suggest_idea()
        .await
        .map_err(generation_error_response)?;

    serde_json::to_value(idea)
        .map_err(|e| error_json(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))
}

fn generation_error_response(error: GenerationError) -> Response {
    log::error!("Backend call failed: {}", error);
    let message = match error {
        GenerationError::MissingCredential => NOT_CONFIGURED.to_string(),
        other => other.to_string(),
    };
    error_json(StatusCode::INTERNAL_SERVER_ERROR, &message)
}

fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
