//! Step 4: compose a prompt from who / what / when / where / style.
//!
//! Enter combines the non-empty fields and generates a sticker from the
//! result. Ctrl+F ("magic fill") fills every field with an idea: the first
//! fill of a view instance uses a fixed local example without touching the
//! backend, later fills ask the text model.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use image::RgbaImage;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;
use tokio::sync::mpsc;

use super::{decode_preview, hint_line, input_text, render_image_panel, set_input_focus, text_input};
use crate::core::gemini::{GenerationResult, Result};
use crate::core::prompt::{PromptField, PromptFields};
use crate::core::wizard::WizardController;
use crate::tui::events::Action;
use crate::tui::services::Services;
use crate::tui::theme;

pub const EMPTY_COMBINATION: &str = "Please fill in at least one field above...";
const COMBINE_HINT: &str = "Press Enter to combine the fields into a prompt...";

// ── Data ─────────────────────────────────────────────────────────────────────

enum BuilderData {
    Generated(Result<GenerationResult>),
    Idea(Result<PromptFields>),
}

// ── State ────────────────────────────────────────────────────────────────────

pub struct PromptBuilderView {
    inputs: [TextArea<'static>; 5],
    focused: usize,
    combined: String,
    generating: bool,
    thinking: bool,
    used_placeholder: bool,
    error: Option<String>,
    preview: Option<RgbaImage>,
    data_tx: mpsc::UnboundedSender<BuilderData>,
    data_rx: mpsc::UnboundedReceiver<BuilderData>,
}

impl Default for PromptBuilderView {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptBuilderView {
    pub fn new() -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let inputs = PromptField::ALL.map(|field| text_input(field.label(), field.hint(), ""));
        let mut view = Self {
            inputs,
            focused: 0,
            combined: COMBINE_HINT.to_string(),
            generating: false,
            thinking: false,
            used_placeholder: false,
            error: None,
            preview: None,
            data_tx,
            data_rx,
        };
        view.apply_focus();
        view
    }

    pub fn is_loading(&self) -> bool {
        self.generating || self.thinking
    }

    pub fn used_placeholder(&self) -> bool {
        self.used_placeholder
    }

    pub fn combined(&self) -> &str {
        &self.combined
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focused_field(&self) -> PromptField {
        PromptField::ALL[self.focused]
    }

    /// Current contents of the five inputs.
    pub fn fields(&self) -> PromptFields {
        let mut fields = PromptFields::default();
        for (field, input) in PromptField::ALL.iter().zip(&self.inputs) {
            fields.set(*field, input_text(input));
        }
        fields
    }

    pub fn set_fields(&mut self, fields: &PromptFields) {
        self.inputs =
            PromptField::ALL.map(|field| text_input(field.label(), field.hint(), fields.get(field)));
        self.apply_focus();
    }

    fn apply_focus(&mut self) {
        for (i, (field, input)) in PromptField::ALL.iter().zip(self.inputs.iter_mut()).enumerate() {
            set_input_focus(input, field.label(), i == self.focused);
        }
    }

    fn focus_next(&mut self) {
        self.focused = (self.focused + 1) % self.inputs.len();
        self.apply_focus();
    }

    fn focus_prev(&mut self) {
        self.focused = (self.focused + self.inputs.len() - 1) % self.inputs.len();
        self.apply_focus();
    }

    // ── Async results ────────────────────────────────────────────────────────

    pub fn poll(&mut self, wizard: &mut WizardController) -> Option<Action> {
        let mut action = None;
        while let Ok(data) = self.data_rx.try_recv() {
            match data {
                BuilderData::Generated(result) => {
                    self.generating = false;
                    match result {
                        Ok(generated) => {
                            self.preview = decode_preview(&generated.image);
                            wizard.set_prompt_builder_image(Some(generated.image));
                        }
                        Err(e) if e.is_missing_credential() => {
                            action = Some(Action::OpenCredentialPrompt);
                        }
                        Err(e) => {
                            log::warn!("Prompt builder generation failed: {e}");
                            self.error = Some(e.to_string());
                        }
                    }
                }
                BuilderData::Idea(result) => {
                    self.thinking = false;
                    match result {
                        Ok(idea) => {
                            self.set_fields(&idea);
                            self.combined = idea.combine();
                        }
                        Err(e) if e.is_missing_credential() => {
                            action = Some(Action::OpenCredentialPrompt);
                        }
                        Err(e) => {
                            log::warn!("Idea request failed: {e}");
                            self.combined = format!("Could not fetch an idea: {e}");
                            self.error = Some(e.to_string());
                        }
                    }
                }
            }
        }
        action
    }

    // ── Input handling ───────────────────────────────────────────────────────

    pub fn handle_input(
        &mut self,
        event: &Event,
        wizard: &mut WizardController,
        services: &Services,
    ) -> bool {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Char('f') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.magic_fill(wizard, services);
                true
            }
            KeyCode::Enter => {
                self.combine_and_generate(wizard, services);
                true
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                true
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_prev();
                true
            }
            _ => {
                self.inputs[self.focused].input(event.clone());
                true
            }
        }
    }

    /// Combine the fields and, when anything is left, generate from it.
    /// Ignored while a generation or an idea request is in flight.
    pub fn combine_and_generate(&mut self, wizard: &mut WizardController, services: &Services) {
        if self.is_loading() {
            return;
        }

        let prompt = self.fields().combine();
        if prompt.is_empty() {
            self.error = None;
            self.preview = None;
            wizard.set_prompt_builder_image(None);
            self.combined = EMPTY_COMBINATION.to_string();
            return;
        }
        if !services.require_credential() {
            return;
        }

        self.error = None;
        self.preview = None;
        wizard.set_prompt_builder_image(None);
        self.combined = prompt.clone();
        self.generating = true;

        let backend = services.backend.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let result = backend.generate_sticker(&prompt).await;
            let _ = tx.send(BuilderData::Generated(result));
        });
    }

    /// Fill every field with an idea. The first call is answered locally.
    pub fn magic_fill(&mut self, wizard: &mut WizardController, services: &Services) {
        if self.is_loading() {
            return;
        }
        if self.used_placeholder && !services.require_credential() {
            return;
        }

        self.error = None;
        self.preview = None;
        wizard.set_prompt_builder_image(None);

        if !self.used_placeholder {
            let idea = PromptFields::placeholder();
            self.set_fields(&idea);
            self.combined = idea.combine();
            self.used_placeholder = true;
            return;
        }

        self.thinking = true;
        let backend = services.backend.clone();
        let tx = self.data_tx.clone();
        tokio::spawn(async move {
            let result = backend.suggest_idea().await;
            let _ = tx.send(BuilderData::Idea(result));
        });
    }

    // ── Rendering ────────────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Build a better prompt");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([Constraint::Min(8), Constraint::Length(1)]).split(inner);
        let cols = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[0]);

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(std::iter::repeat(Constraint::Length(3)).take(self.inputs.len()));
        constraints.push(Constraint::Min(0));
        let left = Layout::vertical(constraints).split(cols[0]);

        let fill_label = if self.thinking {
            Span::styled("AI is thinking...", theme::highlight())
        } else {
            Span::styled("Ctrl+F: fill with an AI example", theme::key_hint())
        };
        frame.render_widget(Paragraph::new(Line::from(fill_label)), left[0]);

        for (i, input) in self.inputs.iter().enumerate() {
            frame.render_widget(input, left[i + 1]);
        }

        let right = Layout::vertical([Constraint::Length(5), Constraint::Min(4)]).split(cols[1]);

        let combined_style = if self.error.is_some() {
            theme::error()
        } else {
            Style::default().fg(theme::TEXT)
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(self.combined.as_str(), combined_style)))
                .wrap(Wrap { trim: true })
                .block(theme::block_default("Combined prompt")),
            right[0],
        );

        let empty = if self.generating {
            Line::from(Span::styled("Generating...", theme::muted()))
        } else if let Some(err) = &self.error {
            Line::from(Span::styled(format!("Generation failed: {err}"), theme::error()))
        } else {
            Line::from(Span::styled("Your sticker will appear here", theme::dim()))
        };
        render_image_panel(
            frame,
            right[1],
            theme::block_default("Result"),
            self.preview.as_ref(),
            empty,
        );

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("Tab", "next field"),
                ("Enter", "combine & generate"),
                ("Ctrl+F", "magic fill"),
                ("Ctrl+N", "next"),
            ])),
            rows[1],
        );
    }
}
