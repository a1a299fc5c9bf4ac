//! Step 5: image-to-image. Two tabs, free-form edit and style transfer,
//! each applied to the prompt-builder sticker (or the built-in sample).
//!
//! The tabs keep separate inputs, loading flags, errors and results, so a
//! style request may run while an edit is still in flight.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use image::RgbaImage;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};
use ratatui_textarea::TextArea;
use tokio::sync::mpsc;

use super::{decode_preview, hint_line, input_text, render_image_panel, text_input};
use crate::core::gemini::{GenerationResult, Result};
use crate::core::prompt::style_instruction;
use crate::core::sticker::{placeholder_sticker, StickerImage};
use crate::core::wizard::WizardController;
use crate::tui::events::Action;
use crate::tui::services::Services;
use crate::tui::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTab {
    Edit,
    Style,
}

impl EditTab {
    pub fn title(&self) -> &'static str {
        match self {
            EditTab::Edit => "Edit (inpainting)",
            EditTab::Style => "Style transfer",
        }
    }

    fn index(&self) -> usize {
        match self {
            EditTab::Edit => 0,
            EditTab::Style => 1,
        }
    }

    fn toggle(self) -> Self {
        match self {
            EditTab::Edit => EditTab::Style,
            EditTab::Style => EditTab::Edit,
        }
    }
}

/// Input, request state and result of one tab.
pub struct EditPane {
    tab: EditTab,
    input: TextArea<'static>,
    loading: bool,
    error: Option<String>,
    result: Option<StickerImage>,
    preview: Option<RgbaImage>,
    data_tx: mpsc::UnboundedSender<Result<GenerationResult>>,
    data_rx: mpsc::UnboundedReceiver<Result<GenerationResult>>,
}

impl EditPane {
    fn new(tab: EditTab) -> Self {
        let (data_tx, data_rx) = mpsc::unbounded_channel();
        let (title, placeholder) = match tab {
            EditTab::Edit => ("Edit instruction", "e.g. add a small red scarf"),
            EditTab::Style => ("Style", "e.g. watercolor, pixel art, Van Gogh"),
        };
        Self {
            tab,
            input: text_input(title, placeholder, ""),
            loading: false,
            error: None,
            result: None,
            preview: None,
            data_tx,
            data_rx,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn result(&self) -> Option<&StickerImage> {
        self.result.as_ref()
    }

    fn instruction(&self) -> Option<String> {
        let text = input_text(&self.input);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(match self.tab {
            EditTab::Edit => text.to_string(),
            EditTab::Style => style_instruction(text),
        })
    }

    fn submit(&mut self, source: &StickerImage, services: &Services) {
        if self.loading {
            return;
        }
        let Some(instruction) = self.instruction() else {
            return;
        };
        if !services.require_credential() {
            return;
        }

        self.loading = true;
        self.error = None;
        self.result = None;
        self.preview = None;

        let backend = services.backend.clone();
        let tx = self.data_tx.clone();
        let source = source.clone();
        tokio::spawn(async move {
            let result = backend.edit_image(&source, &instruction).await;
            let _ = tx.send(result);
        });
    }

    fn poll(&mut self) -> Option<Action> {
        let mut action = None;
        while let Ok(result) = self.data_rx.try_recv() {
            self.loading = false;
            match result {
                Ok(edited) => {
                    self.preview = decode_preview(&edited.image);
                    self.result = Some(edited.image);
                }
                Err(e) if e.is_missing_credential() => {
                    action = Some(Action::OpenCredentialPrompt);
                }
                Err(e) => {
                    log::warn!("{} request failed: {e}", self.tab.title());
                    self.error = Some(e.to_string());
                }
            }
        }
        action
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([Constraint::Length(3), Constraint::Min(4)]).split(area);
        frame.render_widget(&self.input, rows[0]);

        let empty = if self.loading {
            Line::from(Span::styled("Working on it...", theme::muted()))
        } else if let Some(err) = &self.error {
            Line::from(Span::styled(format!("Request failed: {err}"), theme::error()))
        } else {
            let text = match self.tab {
                EditTab::Edit => "The edited sticker will appear here",
                EditTab::Style => "The restyled sticker will appear here",
            };
            Line::from(Span::styled(text, theme::dim()))
        };
        render_image_panel(
            frame,
            rows[1],
            theme::block_default("Result"),
            self.preview.as_ref(),
            empty,
        );
    }
}

pub struct EditView {
    active: EditTab,
    edit: EditPane,
    style: EditPane,
    source: Option<StickerImage>,
    source_preview: Option<RgbaImage>,
    using_placeholder: bool,
}

impl Default for EditView {
    fn default() -> Self {
        Self::new()
    }
}

impl EditView {
    pub fn new() -> Self {
        Self {
            active: EditTab::Edit,
            edit: EditPane::new(EditTab::Edit),
            style: EditPane::new(EditTab::Style),
            source: None,
            source_preview: None,
            using_placeholder: false,
        }
    }

    pub fn active_tab(&self) -> EditTab {
        self.active
    }

    pub fn pane(&self, tab: EditTab) -> &EditPane {
        match tab {
            EditTab::Edit => &self.edit,
            EditTab::Style => &self.style,
        }
    }

    fn active_pane_mut(&mut self) -> &mut EditPane {
        match self.active {
            EditTab::Edit => &mut self.edit,
            EditTab::Style => &mut self.style,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.edit.loading || self.style.loading
    }

    pub fn using_placeholder(&self) -> bool {
        self.using_placeholder
    }

    /// Image the tabs operate on.
    pub fn source(&self) -> Option<&StickerImage> {
        self.source.as_ref()
    }

    pub fn on_enter(&mut self, wizard: &WizardController) {
        match wizard.prompt_builder_image() {
            Some(image) => {
                self.source = Some(image.clone());
                self.using_placeholder = false;
            }
            None => {
                self.using_placeholder = true;
                self.source = match placeholder_sticker() {
                    Ok(image) => Some(image),
                    Err(e) => {
                        log::error!("Could not build the sample sticker: {e}");
                        None
                    }
                };
            }
        }
        self.source_preview = self.source.as_ref().and_then(decode_preview);
    }

    pub fn poll(&mut self) -> Option<Action> {
        let edit = self.edit.poll();
        let style = self.style.poll();
        edit.or(style)
    }

    pub fn handle_input(&mut self, event: &Event, services: &Services) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.active = self.active.toggle();
                true
            }
            KeyCode::Enter => {
                self.submit(services);
                true
            }
            _ => {
                self.active_pane_mut().input.input(event.clone());
                true
            }
        }
    }

    /// Send the active tab's instruction. Blank instructions are ignored.
    pub fn submit(&mut self, services: &Services) {
        let Some(source) = self.source.clone() else {
            return;
        };
        self.active_pane_mut().submit(&source, services);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("Final step: perfect your sticker");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1), // Tabs
            Constraint::Min(6),    // Body
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let titles = [EditTab::Edit, EditTab::Style].map(|t| t.title());
        let tabs = Tabs::new(titles)
            .select(self.active.index())
            .style(theme::muted())
            .highlight_style(theme::highlight())
            .divider(Span::styled(" │ ", theme::dim()));
        frame.render_widget(tabs, rows[0]);

        let cols = Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(rows[1]);

        let source_title = if self.using_placeholder {
            "Original (sample sticker)"
        } else {
            "Original"
        };
        render_image_panel(
            frame,
            cols[0],
            theme::block_default(source_title),
            self.source_preview.as_ref(),
            Line::from(Span::styled("No source image", Style::default().fg(theme::ERROR))),
        );

        self.pane(self.active).render(frame, cols[1]);

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("Tab", "switch tab"),
                ("Enter", "apply"),
                ("Ctrl+N", "restart"),
            ])),
            rows[2],
        );
    }
}
