/// Events flowing through the Elm-architecture event loop.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Raw terminal input (keyboard/mouse).
    Input(crossterm::event::Event),
    /// A resolved action sent by a view through `Services::event_tx`.
    Action(Action),
    /// Notification to display to the user.
    Notification(Notification),
}

/// High-level actions produced by global keys or by views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Wizard navigation
    NextStep,
    PrevStep,
    Restart,

    // Modals
    OpenCredentialPrompt,
    ShowHelp,
    CloseHelp,

    // Application
    Quit,
}

/// Notification level for the overlay system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A timed notification shown in the overlay.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// Ticks remaining before auto-dismiss.
    pub ttl_ticks: u32,
}

impl Notification {
    /// Default lifetime, in ticks.
    pub const TTL_TICKS: u32 = 100;

    pub fn new(message: impl Into<String>, level: NotificationLevel) -> Self {
        Self {
            message: message.into(),
            level,
            ttl_ticks: Self::TTL_TICKS,
        }
    }
}
