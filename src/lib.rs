/// Sticker Studio - AI Sticker Generation Tutorial (TUI Edition)
///
/// Core library providing the five-step tutorial wizard, the Gemini
/// generation client, credential storage, and the sticker proxy server.

pub mod config;
pub mod core;
pub mod server;
pub mod tui;

#[cfg(test)]
mod tests;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
