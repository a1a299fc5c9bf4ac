//! One-line progress indicator for the five wizard steps.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::wizard::Step;
use crate::tui::theme;

const DONE: &str = "✓";
const CONNECTOR: &str = " ── ";

pub struct StepProgress {
    current: usize,
}

impl StepProgress {
    pub fn new(current: usize) -> Self {
        Self { current }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, step) in Step::ALL.iter().enumerate() {
            if i > 0 {
                let style = if i <= self.current {
                    Style::default().fg(theme::PRIMARY)
                } else {
                    theme::dim()
                };
                spans.push(Span::styled(CONNECTOR, style));
            }

            let (marker, style) = if i < self.current {
                (DONE.to_string(), Style::default().fg(theme::SUCCESS))
            } else if i == self.current {
                ((i + 1).to_string(), theme::highlight().add_modifier(Modifier::REVERSED))
            } else {
                ((i + 1).to_string(), theme::dim())
            };

            spans.push(Span::styled(format!(" {marker} "), style));
            spans.push(Span::styled(
                format!(" {}", step.title()),
                if i == self.current {
                    theme::heading()
                } else {
                    theme::muted()
                },
            ));
        }
        Line::from(spans)
    }
}

impl Widget for StepProgress {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let line = self.line();
        let width = line.width() as u16;
        // Center when it fits, otherwise left-align and let it clip
        let x = area.x + area.width.saturating_sub(width) / 2;
        buf.set_line(x, area.y, &line, area.width.saturating_sub(x - area.x));
    }
}
