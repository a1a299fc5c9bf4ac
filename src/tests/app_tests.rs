//! App-level routing: modal priority, global keys, step gating, restart.

use std::sync::Arc;

use crossterm::event::KeyCode;
use rstest::rstest;

use super::mocks::{
    chars, credentials, ctrl, generation_for, key, sample_image, services_with_store, settle,
    TEST_KEY,
};
use crate::core::credentials::{CredentialError, CredentialStore, MemoryCredentialStore};
use crate::core::gemini::{GenerationError, MockStickerBackend};
use crate::core::wizard::Step;
use crate::tui::app::AppState;
use crate::tui::events::{Action, AppEvent, Notification, NotificationLevel};

fn app(backend: MockStickerBackend, key: Option<&str>) -> AppState {
    app_with_store(backend, credentials(key))
}

fn app_with_store(backend: MockStickerBackend, store: Arc<dyn CredentialStore>) -> AppState {
    let (services, event_rx) = services_with_store(backend, store);
    AppState::new(event_rx, services)
}

/// Keychain that is reachable for reads but refuses writes.
struct ReadOnlyStore;

impl CredentialStore for ReadOnlyStore {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        Ok(None)
    }

    fn set(&self, _key: &str) -> Result<(), CredentialError> {
        Err(CredentialError::Poisoned)
    }

    fn clear(&self) -> Result<(), CredentialError> {
        Ok(())
    }
}

fn input(app: &mut AppState, event: crossterm::event::Event) {
    app.handle_event(AppEvent::Input(event));
}

/// Walk the wizard to the last step with both images in place.
fn at_last_step(app: &mut AppState) {
    app.wizard.set_generated_image(Some(sample_image()));
    app.handle_action(Action::NextStep);
    app.handle_action(Action::NextStep);
    app.handle_action(Action::NextStep);
    app.wizard.set_prompt_builder_image(Some(sample_image()));
    app.handle_action(Action::NextStep);
    assert_eq!(app.wizard.step(), Step::Edit);
}

#[test]
fn test_modal_opens_at_startup_without_key() {
    let without_key = app(MockStickerBackend::new(), None);
    assert!(without_key.credential_modal.is_some());

    let with_key = app(MockStickerBackend::new(), Some(TEST_KEY));
    assert!(with_key.credential_modal.is_none());
}

#[test]
fn test_modal_swallows_navigation_keys() {
    let mut app = app(MockStickerBackend::new(), None);
    input(&mut app, ctrl('n'));
    input(&mut app, key(KeyCode::F(1)));
    assert!(app.credential_modal.is_some());
    assert!(!app.show_help);
    assert_eq!(app.wizard.step(), Step::Generate);
}

#[rstest]
#[case('c')]
#[case('q')]
fn test_quit_from_modal_when_key_cannot_be_saved(#[case] quit: char) {
    let mut app = app_with_store(MockStickerBackend::new(), Arc::new(ReadOnlyStore));
    assert!(app.credential_modal.is_some());

    for event in chars(TEST_KEY) {
        input(&mut app, event);
    }
    input(&mut app, key(KeyCode::Enter));
    input(&mut app, key(KeyCode::Esc));
    assert!(app.running);
    assert!(app.credential_modal.is_some());

    input(&mut app, ctrl(quit));
    assert!(!app.running);
}

#[test]
fn test_saving_key_closes_modal() {
    let mut app = app(MockStickerBackend::new(), None);
    for c in TEST_KEY.chars() {
        input(&mut app, key(KeyCode::Char(c)));
    }
    input(&mut app, key(KeyCode::Enter));

    assert!(app.credential_modal.is_none());
    assert!(app
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Success));
}

#[test]
fn test_ctrl_n_is_gated_on_first_step() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    input(&mut app, ctrl('n'));

    assert_eq!(app.wizard.step(), Step::Generate);
    assert_eq!(app.notifications.len(), 1);
    assert_eq!(app.notifications[0].level, NotificationLevel::Warning);
}

#[test]
fn test_ctrl_n_and_ctrl_p_navigate() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    app.wizard.set_generated_image(Some(sample_image()));

    input(&mut app, ctrl('n'));
    assert_eq!(app.wizard.step(), Step::Explainer);
    input(&mut app, ctrl('n'));
    assert_eq!(app.wizard.step(), Step::Diffusion);
    input(&mut app, ctrl('p'));
    assert_eq!(app.wizard.step(), Step::Explainer);
}

#[test]
fn test_next_on_last_step_restarts() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    at_last_step(&mut app);

    app.handle_action(Action::NextStep);

    assert_eq!(app.wizard.step(), Step::Generate);
    assert!(app.wizard.generated_image().is_none());
    assert!(app.wizard.prompt_builder_image().is_none());
    assert!(!app.prompt_builder.used_placeholder());
}

#[test]
fn test_help_modal_toggles() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    input(&mut app, key(KeyCode::F(1)));
    assert!(app.show_help);

    // Navigation is blocked while help is open
    input(&mut app, ctrl('n'));
    assert!(app.show_help);

    input(&mut app, key(KeyCode::Esc));
    assert!(!app.show_help);
}

#[test]
fn test_ctrl_c_quits() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    input(&mut app, ctrl('c'));
    assert!(!app.running);
}

#[test]
fn test_ctrl_k_opens_closable_modal() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    input(&mut app, ctrl('k'));
    let modal = app.credential_modal.as_ref().expect("modal open");
    assert!(modal.can_close());

    input(&mut app, key(KeyCode::Esc));
    assert!(app.credential_modal.is_none());
}

#[tokio::test]
async fn test_enter_generates_through_app() {
    let mut backend = MockStickerBackend::new();
    backend
        .expect_generate_sticker()
        .times(1)
        .returning(|prompt| Ok(generation_for(prompt)));
    let mut app = app(backend, Some(TEST_KEY));

    input(&mut app, key(KeyCode::Enter));
    assert!(app.is_busy());

    settle(|| {
        app.on_tick();
        !app.is_busy()
    })
    .await;

    assert!(app.wizard.can_advance());
    input(&mut app, ctrl('n'));
    assert_eq!(app.wizard.step(), Step::Explainer);
}

#[tokio::test]
async fn test_keyless_enter_keeps_sticker_and_opens_modal() {
    let store = Arc::new(MemoryCredentialStore::with_key(Some(TEST_KEY)));
    let mut backend = MockStickerBackend::new();
    backend.expect_generate_sticker().times(0);
    let mut app = app_with_store(backend, store.clone());
    app.wizard.set_generated_image(Some(sample_image()));

    store.clear().unwrap();
    input(&mut app, key(KeyCode::Enter));
    app.drain_events();

    assert!(app.credential_modal.is_some());
    assert!(!app.is_busy());
    assert!(app.wizard.generated_image().is_some());
    assert!(app.wizard.can_advance());
    assert!(app
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Warning));
}

#[test]
fn test_action_and_notification_events_are_applied() {
    let mut app = app(MockStickerBackend::new(), Some(TEST_KEY));
    app.handle_event(AppEvent::Notification(Notification::new(
        "hello",
        NotificationLevel::Info,
    )));
    app.handle_event(AppEvent::Action(Action::ShowHelp));

    assert_eq!(app.notifications.len(), 1);
    assert!(app.show_help);
}

#[tokio::test]
async fn test_missing_credential_opens_modal() {
    let mut backend = MockStickerBackend::new();
    backend
        .expect_generate_sticker()
        .returning(|_| Err(GenerationError::MissingCredential));
    let mut app = app(backend, Some(TEST_KEY));

    input(&mut app, key(KeyCode::Enter));
    settle(|| {
        app.on_tick();
        app.credential_modal.is_some()
    })
    .await;

    assert!(app
        .notifications
        .iter()
        .any(|n| n.level == NotificationLevel::Warning));
}
