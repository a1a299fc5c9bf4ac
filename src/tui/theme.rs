//! Indigo & violet color theme for the Sticker Studio TUI.
//!
//! All color constants are RGB truecolor. Views import from here
//! instead of using inline `Color::*` literals.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders};

// ── Primary palette ─────────────────────────────────────────────────────────

/// Indigo, primary accent, active step, focused borders.
pub const PRIMARY: Color = Color::Rgb(0x63, 0x66, 0xF1);
/// Light indigo, highlights and hints.
pub const PRIMARY_LIGHT: Color = Color::Rgb(0x81, 0x8C, 0xF8);

// ── Accent ──────────────────────────────────────────────────────────────────

/// Violet, calls to action.
pub const ACCENT: Color = Color::Rgb(0xA8, 0x55, 0xF7);

// ── Backgrounds ─────────────────────────────────────────────────────────────

/// Slate, base background. Transparent sticker pixels are composited on it.
pub const BG_BASE: Color = Color::Rgb(0x0F, 0x17, 0x2A);
pub const BG_SURFACE: Color = Color::Rgb(0x1E, 0x29, 0x3B);

// ── Text ────────────────────────────────────────────────────────────────────

pub const TEXT: Color = Color::Rgb(0xE2, 0xE8, 0xF0);
pub const TEXT_MUTED: Color = Color::Rgb(0x94, 0xA3, 0xB8);
pub const TEXT_DIM: Color = Color::Rgb(0x47, 0x55, 0x69);

// ── Semantic ────────────────────────────────────────────────────────────────

pub const ERROR: Color = Color::Rgb(0xF8, 0x71, 0x71);
pub const SUCCESS: Color = Color::Rgb(0x4A, 0xDE, 0x80);
pub const WARNING: Color = Color::Rgb(0xFB, 0xBF, 0x24);
pub const INFO: Color = Color::Rgb(0x38, 0xBD, 0xF8);

// ── Style helpers ───────────────────────────────────────────────────────────

/// Bold accent text (titles).
pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn heading() -> Style {
    Style::default().fg(PRIMARY_LIGHT).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(PRIMARY)
}

pub fn border_default() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn highlight() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(TEXT_MUTED)
}

pub fn dim() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn error() -> Style {
    Style::default().fg(ERROR)
}

pub fn key_hint() -> Style {
    Style::default().fg(TEXT_DIM)
}

pub fn brand_badge() -> Style {
    Style::default()
        .fg(BG_BASE)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

/// Navigation button, dimmed when the action is unavailable.
pub fn button(enabled: bool) -> Style {
    if enabled {
        Style::default()
            .fg(BG_BASE)
            .bg(PRIMARY)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM).bg(BG_SURFACE)
    }
}

// ── Block builders ──────────────────────────────────────────────────────────

pub fn block_focused(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_focused())
}

pub fn block_default(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(border_default())
}
