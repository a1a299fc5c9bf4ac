//! Shared fixtures for the crate-internal suites.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::core::credentials::{CredentialStore, MemoryCredentialStore};
use crate::core::gemini::{GenerationResult, MockStickerBackend};
use crate::core::prompt::sticker_prompt;
use crate::core::sticker::{placeholder_pixels, StickerImage};
use crate::tui::events::{Action, AppEvent};
use crate::tui::services::Services;

pub const TEST_KEY: &str = "AIzaSyTestKey0123456789abcd";

/// Small but real PNG.
pub fn sample_image() -> StickerImage {
    StickerImage::from_rgba(&placeholder_pixels(16)).expect("encode sample png")
}

/// What a well-behaved backend returns for `prompt`.
pub fn generation_for(prompt: &str) -> GenerationResult {
    GenerationResult {
        image: sample_image(),
        full_prompt: sticker_prompt(prompt),
    }
}

pub fn edit_result(instruction: &str) -> GenerationResult {
    GenerationResult {
        image: sample_image(),
        full_prompt: instruction.to_string(),
    }
}

pub fn credentials(key: Option<&str>) -> Arc<dyn CredentialStore> {
    Arc::new(MemoryCredentialStore::with_key(key))
}

/// Services over a mock backend. The event receiver is dropped.
pub fn services(backend: MockStickerBackend, key: Option<&str>) -> Services {
    services_with_store(backend, credentials(key)).0
}

/// Services over a mock backend and a caller-held store, plus the receiving
/// end of the view event channel.
pub fn services_with_store(
    backend: MockStickerBackend,
    store: Arc<dyn CredentialStore>,
) -> (Services, mpsc::UnboundedReceiver<AppEvent>) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    (Services::new(Arc::new(backend), store, event_tx), event_rx)
}

/// Everything queued on the event channel so far.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> Vec<AppEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Whether `events` holds a request to open the key prompt.
pub fn asks_for_key(events: &[AppEvent]) -> bool {
    events
        .iter()
        .any(|e| matches!(e, AppEvent::Action(Action::OpenCredentialPrompt)))
}

/// Poll `done` until it holds, yielding to spawned backend tasks in between.
pub async fn settle(mut done: impl FnMut() -> bool) {
    for _ in 0..200 {
        if done() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

pub fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl(c: char) -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn chars(text: &str) -> Vec<Event> {
    text.chars().map(|c| key(KeyCode::Char(c))).collect()
}
