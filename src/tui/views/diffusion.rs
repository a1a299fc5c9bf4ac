//! Step 3: the simulated denoising demo.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};
use image::RgbaImage;
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::{decode_preview, hint_line, render_image_panel};
use crate::core::diffusion::{DiffusionDemo, LAST_STAGE};
use crate::core::sticker::placeholder_pixels;
use crate::core::wizard::WizardController;
use crate::tui::theme;

/// Pixel size of the rendered frame; the widget rescales to the panel.
const FRAME_SIZE: u32 = 96;

#[derive(Default)]
pub struct DiffusionView {
    demo: DiffusionDemo,
    source: Option<RgbaImage>,
    using_placeholder: bool,
    frame: Option<RgbaImage>,
}

impl DiffusionView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn demo(&self) -> &DiffusionDemo {
        &self.demo
    }

    pub fn using_placeholder(&self) -> bool {
        self.using_placeholder
    }

    /// Pick up a replaced image (resetting to noise) and redraw.
    pub fn on_enter(&mut self, wizard: &WizardController) {
        self.on_enter_with(wizard, &mut rand::thread_rng());
    }

    pub fn on_enter_with<R: Rng + ?Sized>(&mut self, wizard: &WizardController, rng: &mut R) {
        let changed = self.demo.sync_revision(wizard.image_revision());
        if changed || self.source.is_none() {
            let decoded = wizard.generated_image().and_then(decode_preview);
            self.using_placeholder = decoded.is_none();
            self.source = Some(decoded.unwrap_or_else(|| placeholder_pixels(FRAME_SIZE)));
        }
        self.refresh(rng);
    }

    fn refresh<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.frame = self
            .source
            .as_ref()
            .map(|source| self.demo.render_frame(source, FRAME_SIZE, FRAME_SIZE, rng));
    }

    pub fn handle_input(&mut self, event: &Event) -> bool {
        self.handle_input_with(event, &mut rand::thread_rng())
    }

    pub fn handle_input_with<R: Rng + ?Sized>(&mut self, event: &Event, rng: &mut R) -> bool {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return false;
        };

        match code {
            KeyCode::Enter | KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('l') => {
                self.demo.next();
                self.refresh(rng);
                true
            }
            KeyCode::Char('r') => {
                self.demo.restart();
                self.refresh(rng);
                true
            }
            _ => false,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = theme::block_focused("How does the AI draw?");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::vertical([
            Constraint::Length(1), // Stage dots
            Constraint::Length(3), // Caption
            Constraint::Min(4),    // Frame
            Constraint::Length(1), // Hints
        ])
        .split(inner);

        let stage = self.demo.stage();
        let dots: Vec<Span> = (0..=LAST_STAGE)
            .map(|i| {
                if i <= stage {
                    Span::styled(" ● ", Style::default().fg(theme::PRIMARY))
                } else {
                    Span::styled(" ○ ", theme::dim())
                }
            })
            .collect();
        frame.render_widget(
            Paragraph::new(Line::from(dots)).alignment(Alignment::Center),
            chunks[0],
        );

        let caption = self.demo.caption();
        frame.render_widget(
            Paragraph::new(vec![
                Line::from(Span::styled(caption.title, theme::heading())),
                Line::from(Span::styled(caption.body, theme::muted())),
            ])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            chunks[1],
        );

        let title = if self.using_placeholder {
            "Sample sticker"
        } else {
            "Your sticker"
        };
        render_image_panel(
            frame,
            chunks[2],
            theme::block_default(title),
            self.frame.as_ref(),
            Line::raw(""),
        );

        let hints = if self.demo.is_finished() {
            hint_line(&[("r", "replay"), ("Ctrl+N", "next")])
        } else {
            hint_line(&[("Space/Enter", "next stage"), ("r", "restart")])
        };
        frame.render_widget(Paragraph::new(hints), chunks[3]);
    }
}
