//! Step 1: type an idea and generate a first sticker.
//!
//! An empty input falls back to [`DEFAULT_PROMPT`]. The prompt actually used
//! is recorded on the wizard before the request goes out, and the decorated
//! prompt sent to the model is shown once the image arrives.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use image::RgbaImage;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;
use tokio::sync::mpsc;

use super::{decode_preview, hint_line, input_text, render_image_panel, text_input};
use crate::core::gemini::{GenerationResult, Result};
use crate::core::prompt::DEFAULT_PROMPT;
use crate::core::wizard::WizardController;
use crate::tui::events::Action;
use crate::tui::services::Services;
use crate::tui::theme;

const INPUT_TITLE: &str = "Your sticker idea";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateStatus {
    Idle,
    Working,
    Done,
    Failed(String),
}

pub struct GenerateView {
    input: TextArea<'static>,
    status: GenerateStatus,
    full_prompt: Option<String>,
    preview: Option<RgbaImage>,
    data_tx: mpsc::UnboundedSender<Result<GenerationResult>>,
    data_rx: mpsc::UnboundedReceiver<Result<GenerationResult>>,
}

impl Default for GenerateView {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerateView {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let mut input = text_input(INPUT_TITLE, &format!("e.g. {DEFAULT_PROMPT}"), "");
        super::set_input_focus(&mut input, INPUT_TITLE, true);
        Self {
            input,
            status: GenerateStatus::Idle,
            full_prompt: None,
            preview: None,
            data_tx,
            data_rx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == GenerateStatus::Working
    }

    pub fn status(&self) -> &GenerateStatus {
        &self.status
    }

    pub fn full_prompt(&self) -> Option<&str> {
        self.full_prompt.as_deref()
    }

    // ── Async results ───────────────────────────────────────────────────

    pub fn poll(&mut self, wizard: &mut WizardController) -> Option<Action> {
        let mut action = None;
        while let Ok(result) = self.data_rx.try_recv() {
            match result {
                Ok(generated) => {
                    self.preview = decode_preview(&generated.image);
                    self.full_prompt = Some(generated.full_prompt);
                    wizard.set_generated_image(Some(generated.image));
                    self.status = GenerateStatus::Done;
                }
                Err(e) if e.is_missing_credential() => {
                    self.status = GenerateStatus::Idle;
                    action = Some(Action::OpenCredentialPrompt);
                }
                Err(e) => {
                    log::warn!("Sticker generation failed: {e}");
                    self.status = GenerateStatus::Failed(e.to_string());
                }
            }
        }
        action
    }

    // ── Input handling ──────────────────────────────────────────────────

    pub fn handle_input(
        &mut self,
        event: &Event,
        wizard: &mut WizardController,
        services: &Services,
    ) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        if *code == KeyCode::Enter {
            self.submit(wizard, services);
            return true;
        }
        if self.is_loading() {
            return true;
        }
        self.input.input(event.clone());
        true
    }

    /// Prompt sent for the current input.
    pub fn effective_prompt(&self) -> String {
        let typed = input_text(&self.input);
        let typed = typed.trim();
        if typed.is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            typed.to_string()
        }
    }

    pub fn submit(&mut self, wizard: &mut WizardController, services: &Services) {
        if self.is_loading() || !services.require_credential() {
            return;
        }

        let prompt = self.effective_prompt();
        wizard.set_last_prompt(prompt.clone());
        wizard.set_generated_image(None);
        self.preview = None;
        self.full_prompt = None;
        self.status = GenerateStatus::Working;

        let backend = services.backend.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let result = backend.generate_sticker(&prompt).await;
            let _ = tx.send(result);
        });
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Create your own sticker");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(2), // Intro
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
            Constraint::Min(4),    // Image
            Constraint::Length(3), // Full prompt
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let intro = Paragraph::new(vec![Line::from(Span::styled(
            "Describe a sticker you have never seen before and let the AI draw it.",
            theme::muted(),
        ))])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
        frame.render_widget(intro, chunks[0]);

        frame.render_widget(&self.input, chunks[1]);

        let status = match &self.status {
            GenerateStatus::Idle => Line::raw(""),
            GenerateStatus::Working => {
                Line::from(Span::styled("The AI is working on your sticker...", theme::highlight()))
            }
            GenerateStatus::Done => Line::from(Span::styled(
                "Done! Press Ctrl+N to continue.",
                ratatui::style::Style::default().fg(theme::SUCCESS),
            )),
            GenerateStatus::Failed(msg) => {
                Line::from(Span::styled(format!("Generation failed: {msg}"), theme::error()))
            }
        };
        frame.render_widget(Paragraph::new(status).alignment(Alignment::Center), chunks[2]);

        let empty = if self.is_loading() {
            Line::from(Span::styled("Generating...", theme::muted()))
        } else {
            Line::from(Span::styled("Your sticker will appear here", theme::dim()))
        };
        render_image_panel(
            frame,
            chunks[3],
            theme::block_default("Sticker"),
            self.preview.as_ref(),
            empty,
        );

        if let Some(full_prompt) = &self.full_prompt {
            let prompt = Paragraph::new(vec![
                Line::from(Span::styled("Prompt sent to the model:", theme::dim())),
                Line::from(Span::styled(full_prompt.as_str(), theme::muted())),
            ])
            .wrap(Wrap { trim: true });
            frame.render_widget(prompt, chunks[4]);
        }

        frame.render_widget(
            Paragraph::new(hint_line(&[("Enter", "generate"), ("Ctrl+N", "next"), ("F1", "help")])),
            chunks[5],
        );
    }
}
