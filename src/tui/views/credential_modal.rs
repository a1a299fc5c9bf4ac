//! Gemini API key modal overlay.
//!
//! Opened with `Ctrl+K`, automatically at start-up when no key is stored,
//! and whenever a backend call reports a missing key. Esc only closes the
//! modal once a key exists.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;

use super::hint_line;
use crate::core::credentials::{looks_like_gemini_key, CredentialError, CredentialStore};
use crate::tui::app::centered_rect;
use crate::tui::theme;

const KEY_URL: &str = "https://aistudio.google.com/app/apikey";

/// Outcome of a key press inside the modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalResult {
    /// Input consumed, modal stays open.
    Consumed,
    /// Key stored; caller closes the modal.
    Saved,
    /// Stored key removed; modal stays open.
    Cleared,
    /// Dismissed without changes.
    Close,
}

pub struct CredentialModal {
    input: TextArea<'static>,
    error: Option<String>,
    has_key: bool,
}

impl CredentialModal {
    pub fn new(has_key: bool) -> Self {
        let mut input = TextArea::default();
        input.set_block(
            Block::default()
                .title(" API key ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::PRIMARY_LIGHT)),
        );
        input.set_placeholder_text("Paste your API key here");
        input.set_mask_char('•');
        input.set_cursor_line_style(Style::default());
        Self {
            input,
            error: None,
            has_key,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether Esc is allowed to dismiss the modal.
    pub fn can_close(&self) -> bool {
        self.has_key
    }

    fn typed(&self) -> String {
        self.input.lines().join("")
    }

    pub fn handle_input(&mut self, event: &Event, store: &dyn CredentialStore) -> ModalResult {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return ModalResult::Consumed;
        };

        match code {
            KeyCode::Esc => {
                if self.can_close() {
                    ModalResult::Close
                } else {
                    self.error = Some("An API key is required to continue.".to_string());
                    ModalResult::Consumed
                }
            }
            KeyCode::Enter => self.save(store),
            KeyCode::Char('x') if modifiers.contains(KeyModifiers::CONTROL) => self.clear(store),
            _ => {
                self.input.input(event.clone());
                self.error = None;
                ModalResult::Consumed
            }
        }
    }

    fn save(&mut self, store: &dyn CredentialStore) -> ModalResult {
        let key = self.typed();
        match store.set(&key) {
            Ok(()) => {
                self.has_key = true;
                self.error = None;
                log::info!("Gemini API key stored");
                ModalResult::Saved
            }
            Err(CredentialError::Empty) => {
                self.error = Some("Please enter an API key.".to_string());
                ModalResult::Consumed
            }
            Err(e) => {
                log::error!("Failed to store API key: {e}");
                self.error = Some(format!("Could not save the key: {e}"));
                ModalResult::Consumed
            }
        }
    }

    fn clear(&mut self, store: &dyn CredentialStore) -> ModalResult {
        match store.clear() {
            Ok(()) => {
                self.has_key = false;
                self.error = None;
                log::info!("Gemini API key cleared");
                ModalResult::Cleared
            }
            Err(e) => {
                log::error!("Failed to clear API key: {e}");
                self.error = Some(format!("Could not clear the key: {e}"));
                ModalResult::Consumed
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 50, area);
        frame.render_widget(Clear, modal);

        let block = Block::default()
            .title(" Gemini API key ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::BG_BASE));
        let inner = block.inner(modal);
        frame.render_widget(block, modal);

        let chunks = Layout::vertical([
            Constraint::Length(3), // Intro
            Constraint::Length(3), // Input
            Constraint::Length(2), // Error / warning
            Constraint::Min(0),
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let intro = Paragraph::new(vec![
            Line::from(Span::styled(
                "The AI features need your own Google AI Studio API key.",
                Style::default().fg(theme::TEXT),
            )),
            Line::from(vec![
                Span::styled("Get one at ", theme::muted()),
                Span::styled(KEY_URL, theme::highlight()),
            ]),
        ])
        .wrap(Wrap { trim: true });
        frame.render_widget(intro, chunks[0]);

        frame.render_widget(&self.input, chunks[1]);

        let typed = self.typed();
        let notice = if let Some(err) = &self.error {
            Some(Line::from(Span::styled(err.as_str(), theme::error())))
        } else if !typed.trim().is_empty() && !looks_like_gemini_key(&typed) {
            Some(Line::from(Span::styled(
                "This does not look like a Gemini key (they usually start with AIza).",
                Style::default().fg(theme::WARNING),
            )))
        } else {
            None
        };
        if let Some(line) = notice {
            frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), chunks[2]);
        }

        let hints = if self.can_close() {
            hint_line(&[("Enter", "save"), ("Ctrl+X", "clear key"), ("Esc", "close")])
        } else {
            hint_line(&[("Enter", "save")])
        };
        frame.render_widget(Paragraph::new(hints), chunks[4]);
    }
}
