use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::core::credentials::{CredentialStore, KeyringCredentialStore};
use crate::core::gemini::{GeminiBackend, GeminiClient, StickerBackend};

use super::events::{Action, AppEvent, Notification, NotificationLevel};

/// Shown when a backend call is attempted without a stored key.
pub const MISSING_KEY_NOTICE: &str = "Set your Gemini API key to use the AI features";

/// Centralized handle to the backend.
///
/// Created once at startup, then lent to views that need backend access.
pub struct Services {
    pub backend: Arc<dyn StickerBackend>,
    pub credentials: Arc<dyn CredentialStore>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
}

impl Services {
    pub fn new(
        backend: Arc<dyn StickerBackend>,
        credentials: Arc<dyn CredentialStore>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            backend,
            credentials,
            event_tx,
        }
    }

    /// Keychain-backed Gemini services from config.
    pub fn init(
        config: &AppConfig,
        event_tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore::new());
        let client = GeminiClient::new(&config.gemini)?;
        log::info!(
            "Gemini client ready (image model: {}, text model: {})",
            config.gemini.image_model,
            config.gemini.text_model
        );
        let backend = Arc::new(GeminiBackend::new(client, credentials.clone()));

        Ok(Self::new(backend, credentials, event_tx))
    }

    /// Whether a key is stored. When it is not, queues the key prompt and a
    /// warning so the caller can bail out before touching any state.
    pub fn require_credential(&self) -> bool {
        if self.credentials.has_key() {
            return true;
        }
        log::info!("Backend call skipped: no API key stored");
        let _ = self.event_tx.send(AppEvent::Notification(Notification::new(
            MISSING_KEY_NOTICE,
            NotificationLevel::Warning,
        )));
        let _ = self.event_tx.send(AppEvent::Action(Action::OpenCredentialPrompt));
        false
    }
}
