//! Sticker generation backend.
//!
//! [`GeminiClient`] speaks HTTP; [`GeminiBackend`] pairs it with a
//! [`CredentialStore`] and is what the TUI and the proxy server hold, behind
//! the [`StickerBackend`] trait so both can be driven by a mock in tests.

pub mod client;
pub mod error;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::GeminiClient;
pub use error::{GenerationError, Result};

use crate::core::credentials::CredentialStore;
use crate::core::prompt::PromptFields;
use crate::core::sticker::StickerImage;

/// A generated or edited image plus the exact text that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub image: StickerImage,
    pub full_prompt: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StickerBackend: Send + Sync {
    /// Decorate `prompt` with the sticker template and generate one image.
    async fn generate_sticker(&self, prompt: &str) -> Result<GenerationResult>;

    /// Apply a natural-language instruction to an existing image.
    async fn edit_image(&self, image: &StickerImage, instruction: &str) -> Result<GenerationResult>;

    /// Ask the text model for a structured prompt idea.
    async fn suggest_idea(&self) -> Result<PromptFields>;
}

pub struct GeminiBackend {
    client: GeminiClient,
    credentials: Arc<dyn CredentialStore>,
}

impl GeminiBackend {
    pub fn new(client: GeminiClient, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Current key, or `MissingCredential` before any request is built.
    fn api_key(&self) -> Result<String> {
        self.credentials
            .get()?
            .ok_or(GenerationError::MissingCredential)
    }
}

#[async_trait]
impl StickerBackend for GeminiBackend {
    async fn generate_sticker(&self, prompt: &str) -> Result<GenerationResult> {
        let api_key = self.api_key()?;
        self.client.generate_sticker(&api_key, prompt).await
    }

    async fn edit_image(&self, image: &StickerImage, instruction: &str) -> Result<GenerationResult> {
        let api_key = self.api_key()?;
        self.client.edit_image(&api_key, image, instruction).await
    }

    async fn suggest_idea(&self) -> Result<PromptFields> {
        let api_key = self.api_key()?;
        self.client.generate_idea(&api_key).await
    }
}
