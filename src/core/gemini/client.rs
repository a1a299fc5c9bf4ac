//! HTTP client for the Generative Language API.
//!
//! Each call is a single `models/{model}:generateContent` POST authenticated
//! with the `x-goog-api-key` header. Image results come back as base64
//! `inlineData` parts; ideas come back as JSON text constrained by a response
//! schema.

use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tracing::instrument;

use super::error::{GenerationError, Result};
use super::GenerationResult;
use crate::config::GeminiConfig;
use crate::core::prompt::{self, PromptFields};
use crate::core::sticker::StickerImage;

const BLOCKED: &str =
    "Invalid API response: No candidates or content parts found. The prompt may have been blocked.";
const NO_IMAGE: &str = "No image data was found in the API response.";

pub const GENERATE_CONTEXT: &str = "Failed to generate image: ";
pub const EDIT_CONTEXT: &str = "Failed to edit image: ";
pub const IDEA_CONTEXT: &str = "Failed to generate idea: ";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    image_model: String,
    text_model: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            image_model: config.image_model.clone(),
            text_model: config.text_model.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    async fn generate_content(&self, api_key: &str, model: &str, body: &Value) -> Result<Value> {
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("content-type", "application/json")
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            log::warn!("Gemini returned {} for model {}", status, model);
            return Err(GenerationError::ExternalService {
                status: Some(status.as_u16()),
                message: format!("API error {}: {}", status.as_u16(), text.trim()),
            });
        }

        resp.json::<Value>().await.map_err(|e| GenerationError::ExternalService {
            status: Some(status.as_u16()),
            message: format!("Invalid API response: {}", e),
        })
    }

    async fn request_image(&self, api_key: &str, body: &Value) -> Result<StickerImage> {
        let response = self.generate_content(api_key, &self.image_model, body).await?;
        first_inline_image(&response)
    }

    /// Generate a sticker from a plain user prompt.
    #[instrument(skip(self, api_key))]
    pub async fn generate_sticker(&self, api_key: &str, prompt: &str) -> Result<GenerationResult> {
        let full_prompt = prompt::sticker_prompt(prompt);
        let body = json!({
            "contents": [{ "parts": [{ "text": full_prompt }] }],
            "generationConfig": { "responseModalities": ["IMAGE"] }
        });

        let image = self
            .request_image(api_key, &body)
            .await
            .map_err(|e| e.context(GENERATE_CONTEXT))?;

        log::info!("Generated sticker ({} bytes)", image.bytes().len());
        Ok(GenerationResult { image, full_prompt })
    }

    /// Send `image` with a free-form instruction and return the edited image.
    #[instrument(skip(self, api_key, image))]
    pub async fn edit_image(
        &self,
        api_key: &str,
        image: &StickerImage,
        instruction: &str,
    ) -> Result<GenerationResult> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": image.mime_type(), "data": image.to_base64() } },
                    { "text": instruction }
                ]
            }],
            "generationConfig": { "responseModalities": ["IMAGE"] }
        });

        let edited = self
            .request_image(api_key, &body)
            .await
            .map_err(|e| e.context(EDIT_CONTEXT))?;

        Ok(GenerationResult {
            image: edited,
            full_prompt: instruction.to_string(),
        })
    }

    /// Ask the text model for a five-part sticker idea.
    #[instrument(skip(self, api_key))]
    pub async fn generate_idea(&self, api_key: &str) -> Result<PromptFields> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt::IDEA_REQUEST }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": prompt::idea_response_schema()
            }
        });

        self.generate_content(api_key, &self.text_model, &body)
            .await
            .and_then(|response| parse_idea(&response))
            .map_err(|e| e.context(IDEA_CONTEXT))
    }
}

fn candidate_parts(response: &Value) -> Result<&Vec<Value>> {
    response["candidates"]
        .as_array()
        .and_then(|arr| arr.first())
        .and_then(|c| c["content"]["parts"].as_array())
        .ok_or_else(|| GenerationError::external(BLOCKED))
}

/// First `inlineData` part of the first candidate.
fn first_inline_image(response: &Value) -> Result<StickerImage> {
    let parts = candidate_parts(response)?;

    let inline = parts
        .iter()
        .find_map(|p| p.get("inlineData").or_else(|| p.get("inline_data")))
        .ok_or_else(|| GenerationError::external(NO_IMAGE))?;

    let data = inline["data"]
        .as_str()
        .ok_or_else(|| GenerationError::external(NO_IMAGE))?;
    let mime_type = inline["mimeType"]
        .as_str()
        .or_else(|| inline["mime_type"].as_str());

    StickerImage::from_base64(mime_type, data)
        .map_err(|e| GenerationError::InvalidImage(e.to_string()))
}

fn parse_idea(response: &Value) -> Result<PromptFields> {
    let text: String = candidate_parts(response)?
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect();

    serde_json::from_str::<PromptFields>(text.trim())
        .map_err(|e| GenerationError::Schema(format!("Unexpected idea format: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_inline_image_skips_text_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Here you go" },
                { "inlineData": { "mimeType": "image/png", "data": "AAEC" } }
            ]}}]
        });
        let image = first_inline_image(&response).unwrap();
        assert_eq!(image.bytes(), &[0, 1, 2]);
        assert_eq!(image.mime_type(), "image/png");
    }

    #[test]
    fn test_no_candidates_is_blocked() {
        let err = first_inline_image(&json!({ "candidates": [] })).unwrap_err();
        assert!(matches!(err, GenerationError::ExternalService { status: None, .. }));
        assert!(err.to_string().contains("may have been blocked"));
    }

    #[test]
    fn test_text_only_response_has_no_image() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "I can't draw that" }] } }]
        });
        let err = first_inline_image(&response).unwrap_err();
        assert_eq!(err.to_string(), NO_IMAGE);
    }

    #[test]
    fn test_parse_idea_joins_text_parts() {
        let response = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "{\"who\":\"a\",\"what\":\"b\"," },
                { "text": "\"when\":\"c\",\"where\":\"d\",\"style\":\"e\"}\n" }
            ]}}]
        });
        let idea = parse_idea(&response).unwrap();
        assert_eq!(idea.combine(), "a, b, c, d, e");
    }

    #[test]
    fn test_parse_idea_schema_error() {
        let response = json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"who\":\"a\"}" }] } }]
        });
        assert!(matches!(parse_idea(&response), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = GeminiConfig {
            base_url: "http://localhost:1234/v1beta/".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("m"),
            "http://localhost:1234/v1beta/models/m:generateContent"
        );
    }
}
