//! Root layout: step progress header, main panel, navigation row, status bar.

use ratatui::layout::{Constraint, Layout, Rect};

/// Height of the step progress header including its border.
pub const PROGRESS_HEIGHT: u16 = 3;
/// Hide the progress header below this terminal height.
pub const HIDE_PROGRESS_THRESHOLD: u16 = 12;

/// Computed layout regions for a single frame.
pub struct AppLayout {
    /// Step progress indicator (None on very short terminals).
    pub progress: Option<Rect>,
    /// Current step view.
    pub main: Rect,
    /// Back / next buttons.
    pub nav: Rect,
    /// Status bar (bottom row).
    pub status: Rect,
}

impl AppLayout {
    pub fn compute(area: Rect) -> Self {
        let show_progress = area.height >= HIDE_PROGRESS_THRESHOLD;
        let progress_height = if show_progress { PROGRESS_HEIGHT } else { 0 };

        let rows = Layout::vertical([
            Constraint::Length(progress_height),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        AppLayout {
            progress: show_progress.then_some(rows[0]),
            main: rows[1],
            nav: rows[2],
            status: rows[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_layout() {
        let area = Rect::new(0, 0, 100, 40);
        let layout = AppLayout::compute(area);
        assert_eq!(layout.progress.unwrap().height, PROGRESS_HEIGHT);
        assert_eq!(layout.nav.height, 1);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 39);
    }

    #[test]
    fn test_short_terminal_hides_progress() {
        let area = Rect::new(0, 0, 80, 10);
        let layout = AppLayout::compute(area);
        assert!(layout.progress.is_none());
        assert_eq!(layout.main.height, 8);
    }

    #[test]
    fn test_rows_fill_height() {
        let area = Rect::new(0, 0, 80, 30);
        let layout = AppLayout::compute(area);
        let progress = layout.progress.map(|p| p.height).unwrap_or(0);
        assert_eq!(
            progress + layout.main.height + layout.nav.height + layout.status.height,
            area.height
        );
    }
}
