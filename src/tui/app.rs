use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use super::events::{Action, AppEvent, Notification, NotificationLevel};
use super::layout::AppLayout;
use super::services::{Services, MISSING_KEY_NOTICE};
use super::theme;
use super::views::credential_modal::{CredentialModal, ModalResult};
use super::views::diffusion::DiffusionView;
use super::views::edit::EditView;
use super::views::explainer::ExplainerView;
use super::views::generate::GenerateView;
use super::views::prompt_builder::PromptBuilderView;
use super::widgets::step_progress::StepProgress;
use crate::core::credentials::mask_api_key;
use crate::core::wizard::{Step, WizardController, TOTAL_STEPS};

/// Central application state (Elm architecture).
pub struct AppState {
    /// Whether the app is still running.
    pub running: bool,
    /// Current step and the images passed between steps.
    pub wizard: WizardController,
    pub generate: GenerateView,
    pub explainer: ExplainerView,
    pub diffusion: DiffusionView,
    pub prompt_builder: PromptBuilderView,
    pub edit: EditView,
    /// API key modal (Some when open).
    pub credential_modal: Option<CredentialModal>,
    /// Masked key for the status bar, None when no key is stored.
    key_display: Option<String>,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    /// Whether the help modal is open.
    pub show_help: bool,
    /// Receiver for events sent by views through `Services::event_tx`.
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Backend services handle.
    services: Services,
}

impl AppState {
    pub fn new(
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        services: Services,
    ) -> Self {
        let mut state = Self {
            running: true,
            wizard: WizardController::new(),
            generate: GenerateView::new(),
            explainer: ExplainerView::new(),
            diffusion: DiffusionView::new(),
            prompt_builder: PromptBuilderView::new(),
            edit: EditView::new(),
            credential_modal: None,
            key_display: None,
            notifications: Vec::new(),
            show_help: false,
            event_rx,
            services,
        };

        state.refresh_key_display();
        if state.key_display.is_none() {
            state.credential_modal = Some(CredentialModal::new(false));
        }
        state
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut event_stream = EventStream::new();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.on_tick();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(crossterm_event) => {
                // Quit always works, even from the key modal
                if is_quit_key(&crossterm_event) {
                    self.handle_action(Action::Quit);
                    return;
                }

                // Priority 1: API key modal consumes all other input when open
                if let Some(ref mut modal) = self.credential_modal {
                    match modal.handle_input(&crossterm_event, self.services.credentials.as_ref()) {
                        ModalResult::Consumed => {}
                        ModalResult::Saved => {
                            self.credential_modal = None;
                            self.refresh_key_display();
                            self.push_notification(
                                "API key saved".to_string(),
                                NotificationLevel::Success,
                            );
                        }
                        ModalResult::Cleared => {
                            self.refresh_key_display();
                            self.push_notification(
                                "API key removed".to_string(),
                                NotificationLevel::Info,
                            );
                        }
                        ModalResult::Close => {
                            self.credential_modal = None;
                        }
                    }
                    return;
                }

                // Priority 2: Help modal
                if self.show_help {
                    if let Some(action) = self.map_help_input(&crossterm_event) {
                        self.handle_action(action);
                    }
                    return;
                }

                // Priority 3: Global Ctrl bindings, before text inputs see them
                if let Some(action) = self.map_input_to_action(&crossterm_event) {
                    self.handle_action(action);
                    return;
                }

                // Priority 4: Current step view
                self.dispatch_view_input(&crossterm_event);
            }
            AppEvent::Action(action) => self.handle_action(action),
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
        }
    }

    /// Handle everything views have queued on the event channel.
    pub fn drain_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Dispatch input to the current step's view. Returns true if consumed.
    fn dispatch_view_input(&mut self, event: &Event) -> bool {
        match self.wizard.step() {
            Step::Generate => self
                .generate
                .handle_input(event, &mut self.wizard, &self.services),
            Step::Explainer => self.explainer.handle_input(event),
            Step::Diffusion => self.diffusion.handle_input(event),
            Step::PromptBuilder => {
                self.prompt_builder
                    .handle_input(event, &mut self.wizard, &self.services)
            }
            Step::Edit => self.edit.handle_input(event, &self.services),
        }
    }

    fn map_help_input(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        match code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                Some(Action::CloseHelp)
            }
            _ => None,
        }
    }

    fn map_input_to_action(&self, event: &Event) -> Option<Action> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return None;
        };

        if *code == KeyCode::F(1) {
            return Some(Action::ShowHelp);
        }

        if !modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }

        match code {
            KeyCode::Char('n') => Some(Action::NextStep),
            KeyCode::Char('p') => Some(Action::PrevStep),
            KeyCode::Char('r') => Some(Action::Restart),
            KeyCode::Char('k') => Some(Action::OpenCredentialPrompt),
            _ => None,
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::NextStep => {
                if self.wizard.step().is_last() {
                    self.restart();
                } else if self.wizard.advance() {
                    self.on_step_changed();
                } else if let Some(reason) = blocked_reason(self.wizard.step()) {
                    self.push_notification(reason.to_string(), NotificationLevel::Warning);
                }
            }
            Action::PrevStep => {
                if self.wizard.retreat() {
                    self.on_step_changed();
                }
            }
            Action::Restart => self.restart(),
            Action::OpenCredentialPrompt => {
                if self.credential_modal.is_none() {
                    self.refresh_key_display();
                    self.credential_modal =
                        Some(CredentialModal::new(self.key_display.is_some()));
                }
            }
            Action::ShowHelp => {
                self.show_help = true;
            }
            Action::CloseHelp => {
                self.show_help = false;
            }
            Action::Quit => {
                self.running = false;
            }
        }
    }

    /// Back to step 1 with fresh views; in-flight results are discarded.
    fn restart(&mut self) {
        log::info!("Restarting the tutorial");
        self.wizard.restart();
        self.generate = GenerateView::new();
        self.explainer = ExplainerView::new();
        self.diffusion = DiffusionView::new();
        self.prompt_builder = PromptBuilderView::new();
        self.edit = EditView::new();
        self.on_step_changed();
    }

    /// Refresh the entering view from wizard state and reset its scroll.
    fn on_step_changed(&mut self) {
        log::debug!("Entered step {}", self.wizard.step().title());
        match self.wizard.step() {
            Step::Explainer => self.explainer.on_enter(&self.wizard),
            Step::Diffusion => self.diffusion.on_enter(&self.wizard),
            Step::Edit => self.edit.on_enter(&self.wizard),
            Step::Generate | Step::PromptBuilder => {}
        }
    }

    fn refresh_key_display(&mut self) {
        self.key_display = match self.services.credentials.get() {
            Ok(key) => key.map(|k| mask_api_key(&k)),
            Err(e) => {
                log::warn!("Could not read the stored API key: {e}");
                self.push_notification(
                    format!("Could not read the stored API key: {e}"),
                    NotificationLevel::Error,
                );
                None
            }
        };
    }

    /// Whether any view is waiting on the backend.
    pub fn is_busy(&self) -> bool {
        self.generate.is_loading() || self.prompt_builder.is_loading() || self.edit.is_loading()
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notifications.push(Notification::new(message, level));

        while self.notifications.len() > 3 {
            self.notifications.remove(0);
        }
    }

    /// Tick: decrement notification TTLs, dismiss expired, poll async data.
    pub fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        self.drain_events();

        let actions = [
            self.generate.poll(&mut self.wizard),
            self.prompt_builder.poll(&mut self.wizard),
            self.edit.poll(),
        ];
        for action in actions.into_iter().flatten() {
            if action == Action::OpenCredentialPrompt {
                self.push_notification(MISSING_KEY_NOTICE.to_string(), NotificationLevel::Warning);
            }
            self.handle_action(action);
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        if let Some(progress_area) = layout.progress {
            let block = theme::block_default("Sticker Studio");
            let inner = block.inner(progress_area);
            frame.render_widget(block, progress_area);
            frame.render_widget(StepProgress::new(self.wizard.step_index()), inner);
        }

        self.render_content(frame, layout.main);
        self.render_nav(frame, layout.nav);
        self.render_status_bar(frame, layout.status);

        // Overlays
        self.render_notifications(frame, area);

        if self.show_help {
            self.render_help_modal(frame, area);
        }

        if let Some(ref modal) = self.credential_modal {
            modal.render(frame, area);
        }
    }

    fn render_content(&self, frame: &mut Frame, area: Rect) {
        match self.wizard.step() {
            Step::Generate => self.generate.render(frame, area),
            Step::Explainer => self.explainer.render(frame, area),
            Step::Diffusion => self.diffusion.render(frame, area),
            Step::PromptBuilder => self.prompt_builder.render(frame, area),
            Step::Edit => self.edit.render(frame, area),
        }
    }

    fn render_nav(&self, frame: &mut Frame, area: Rect) {
        let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let back = Line::from(Span::styled(
            " ◀ Back (Ctrl+P) ",
            theme::button(self.wizard.step_index() > 0),
        ));
        frame.render_widget(Paragraph::new(back), halves[0]);

        let next = if self.wizard.step().is_last() {
            Span::styled(" ↺ Restart (Ctrl+N) ", theme::button(true))
        } else {
            Span::styled(" Next (Ctrl+N) ▶ ", theme::button(self.wizard.can_advance()))
        };
        frame.render_widget(
            Paragraph::new(Line::from(next)).alignment(Alignment::Right),
            halves[1],
        );
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let step = self.wizard.step();
        let key_status = match &self.key_display {
            Some(masked) => Span::styled(masked.clone(), Style::default().fg(theme::TEXT_MUTED)),
            None => Span::styled("not set", theme::error()),
        };
        let activity = if self.is_busy() {
            Span::styled("working", Style::default().fg(theme::PRIMARY_LIGHT))
        } else {
            Span::styled("ready", Style::default().fg(theme::TEXT_MUTED))
        };

        let status = Line::from(vec![
            Span::styled(" Sticker Studio ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(
                format!("Step {}/{}: {}", step.index() + 1, TOTAL_STEPS, step.title()),
                Style::default()
                    .fg(theme::PRIMARY_LIGHT)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" │ "),
            Span::styled("Key:", theme::key_hint()),
            Span::raw(" "),
            key_status,
            Span::raw(" │ "),
            activity,
            Span::raw(" │ "),
            Span::styled("F1", theme::key_hint()),
            Span::raw(":help "),
            Span::styled("Ctrl+K", theme::key_hint()),
            Span::raw(":key "),
            Span::styled("Ctrl+C", theme::key_hint()),
            Span::raw(":quit"),
        ]);

        frame.render_widget(Paragraph::new(status), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = self.notifications.len() as u16;
        let x = area.width.saturating_sub(max_width + 1);
        let y = 1;

        let notification_area = Rect::new(x, y, max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).bold()),
                    Span::raw(&n.message),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = vec![
            ("Global:", ""),
            ("Ctrl+N", "Next step (restart on the last step)"),
            ("Ctrl+P", "Previous step"),
            ("Ctrl+R", "Restart the tutorial"),
            ("Ctrl+K", "Set or clear the API key"),
            ("F1", "Toggle this help"),
            ("Ctrl+C / Ctrl+Q", "Quit"),
            ("", ""),
            ("1. Create:", ""),
            ("Enter", "Generate a sticker from your idea"),
            ("", ""),
            ("2. What is AI:", ""),
            ("j/k", "Scroll the explanation"),
            ("", ""),
            ("3. How it works:", ""),
            ("Space / Enter", "Next denoising stage"),
            ("r", "Back to pure noise"),
            ("", ""),
            ("4. Prompting:", ""),
            ("Tab / Shift+Tab", "Next / previous field"),
            ("Enter", "Combine fields and generate"),
            ("Ctrl+F", "Fill the fields with an AI example"),
            ("", ""),
            ("5. Editing:", ""),
            ("Tab", "Switch between edit and style transfer"),
            ("Enter", "Apply the instruction"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                " Keybindings",
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];

        for (key, desc) in &keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  {key}"),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        format!("{:<18}", key),
                        Style::default().fg(theme::PRIMARY_LIGHT).bold(),
                    ),
                    Span::raw(*desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("F1", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" or "),
            Span::styled("Esc", Style::default().fg(theme::PRIMARY_LIGHT).bold()),
            Span::raw(" to close"),
        ]));

        let block = theme::block_focused("Help").title_alignment(Alignment::Center);

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}

/// Ctrl+C / Ctrl+Q. Raw mode turns Ctrl+C into a key press, so this is the
/// only way out.
fn is_quit_key(event: &Event) -> bool {
    matches!(
        event,
        Event::Key(KeyEvent {
            code: KeyCode::Char('c') | KeyCode::Char('q'),
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) if modifiers.contains(KeyModifiers::CONTROL)
    )
}

/// Why `advance` refused to leave `step`, if it is gated.
fn blocked_reason(step: Step) -> Option<&'static str> {
    match step {
        Step::Generate => Some("Generate a sticker first, then continue"),
        Step::PromptBuilder => Some("Generate a sticker from your prompt first"),
        _ => None,
    }
}

/// Calculate a centered rect using percentage of parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(50, 50, area);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
        assert!(centered.width > 0);
        assert!(centered.height > 0);
        assert!(centered.x + centered.width <= area.width);
        assert!(centered.y + centered.height <= area.height);
    }

    #[test]
    fn test_only_gated_steps_have_blocked_reason() {
        assert!(blocked_reason(Step::Generate).is_some());
        assert!(blocked_reason(Step::PromptBuilder).is_some());
        assert!(blocked_reason(Step::Explainer).is_none());
        assert!(blocked_reason(Step::Diffusion).is_none());
        assert!(blocked_reason(Step::Edit).is_none());
    }
}
