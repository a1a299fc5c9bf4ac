//! Crate-internal test suites
//!
//! Unit tests live next to their modules. The suites here drive several
//! modules together through a mocked [`StickerBackend`]:
//! - the proxy router, via `tower::ServiceExt::oneshot`
//! - the step views and the app state machine, on a tokio runtime
//!
//! [`StickerBackend`]: crate::core::gemini::StickerBackend

mod app_tests;
mod mocks;
