pub mod credential_modal;
pub mod diffusion;
pub mod edit;
pub mod explainer;
pub mod generate;
pub mod prompt_builder;

use image::RgbaImage;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
    Frame,
};
use ratatui_textarea::TextArea;

use crate::core::sticker::StickerImage;
use crate::tui::theme;
use crate::tui::widgets::sticker::StickerWidget;

/// Bordered single-line input with a placeholder.
pub(crate) fn text_input(title: &str, placeholder: &str, text: &str) -> TextArea<'static> {
    let mut input = TextArea::new(vec![text.to_string()]);
    input.set_block(theme::block_default(title).title_style(theme::heading()));
    input.set_placeholder_text(placeholder.to_string());
    input.set_cursor_line_style(ratatui::style::Style::default());
    input.move_cursor(ratatui_textarea::CursorMove::End);
    input
}

pub(crate) fn set_input_focus(input: &mut TextArea<'static>, title: &str, focused: bool) {
    let block = if focused {
        theme::block_focused(title)
    } else {
        theme::block_default(title)
    };
    input.set_block(block.title_style(theme::heading()));
}

/// Text of a single-line input.
pub(crate) fn input_text(input: &TextArea<'_>) -> String {
    input.lines().join(" ")
}

/// Decode for display, logging instead of failing.
pub(crate) fn decode_preview(image: &StickerImage) -> Option<RgbaImage> {
    match image.decode() {
        Ok(pixels) => Some(pixels),
        Err(e) => {
            log::warn!("Could not decode {} image: {}", image.mime_type(), e);
            None
        }
    }
}

/// Bordered panel showing `image`, or `empty` text when there is none.
pub(crate) fn render_image_panel(
    frame: &mut Frame,
    area: Rect,
    block: Block<'_>,
    image: Option<&RgbaImage>,
    empty: Line<'_>,
) {
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match image {
        Some(pixels) => frame.render_widget(StickerWidget::new(pixels), inner),
        None => {
            let y = inner.y + inner.height.saturating_sub(1) / 2;
            let text_area = Rect::new(inner.x, y, inner.width, inner.height.min(2));
            frame.render_widget(
                Paragraph::new(empty)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true }),
                text_area,
            );
        }
    }
}

/// `Key:label` hint pairs for the bottom line of a view.
pub(crate) fn hint_line(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::with_capacity(pairs.len() * 2);
    for (key, label) in pairs {
        spans.push(Span::styled(*key, theme::key_hint()));
        spans.push(Span::styled(format!(":{label}  "), theme::muted()));
    }
    Line::from(spans)
}
