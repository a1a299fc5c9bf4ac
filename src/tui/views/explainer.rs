//! Step 2: what just happened. Shows the prompt next to the sticker it
//! produced, with a short explanation of generative models.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use image::RgbaImage;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{decode_preview, hint_line, render_image_panel};
use crate::core::prompt::DEFAULT_PROMPT;
use crate::core::wizard::WizardController;
use crate::tui::theme;

const EXPLANATION: [&str; 4] = [
    "Generative AI is a model that has looked at an enormous number of pictures and their descriptions.",
    "It does not copy any one of them. It learned how words relate to shapes, colors and styles.",
    "When you type an idea, the model uses that knowledge to draw a brand new picture that matches it.",
    "Same prompt, different result: every run starts from fresh randomness, so no two stickers are identical.",
];

#[derive(Default)]
pub struct ExplainerView {
    prompt: String,
    preview: Option<RgbaImage>,
    scroll: u16,
}

impl ExplainerView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh from the wizard and scroll back to the top.
    pub fn on_enter(&mut self, wizard: &WizardController) {
        self.scroll = 0;
        self.prompt = if wizard.last_prompt().is_empty() {
            DEFAULT_PROMPT.to_string()
        } else {
            wizard.last_prompt().to_string()
        };
        self.preview = wizard.generated_image().and_then(decode_preview);
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    pub fn handle_input(&mut self, event: &Event) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                true
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                true
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.scroll = 0;
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("What is generative AI?");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(6), // Explanation
            Constraint::Min(6),    // Input → output
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let lines: Vec<Line> = EXPLANATION
            .iter()
            .map(|s| Line::from(Span::styled(*s, theme::muted())))
            .collect();
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .scroll((self.scroll, 0)),
            chunks[0],
        );

        let cols = Layout::horizontal([
            Constraint::Percentage(35),
            Constraint::Length(9),
            Constraint::Min(10),
        ])
        .split(chunks[1]);

        let idea = Paragraph::new(vec![
            Line::raw(""),
            Line::from(Span::styled(format!("\"{}\"", self.prompt), theme::highlight())),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(theme::block_default("Your idea (input)"));
        frame.render_widget(idea, cols[0]);

        let arrow_y = cols[1].y + cols[1].height / 2;
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled("AI", theme::heading())),
                Line::from(Span::styled("───▶", theme::heading())),
            ])
            .alignment(Alignment::Center),
            Rect::new(cols[1].x, arrow_y.saturating_sub(1), cols[1].width, 2),
        );

        render_image_panel(
            frame,
            cols[2],
            theme::block_default("Generated sticker (output)"),
            self.preview.as_ref(),
            Line::from(Span::styled("No sticker yet", theme::dim())),
        );

        frame.render_widget(
            Paragraph::new(hint_line(&[
                ("j/k", "scroll"),
                ("Ctrl+P", "back"),
                ("Ctrl+N", "next"),
            ])),
            chunks[2],
        );
    }
}
