pub mod system;

pub use system::*;

use crate::core::cycle::TimerHandle;
use crate::core::navigation::{CycleState, Status};

/// Inputs to a running kiosk: user actions, timer ticks and the display's
/// load lifecycle callbacks. Hosts translate their native events into these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    CycleTick(TimerHandle),
    Next,
    Previous,
    TogglePause,
    SetPaused(bool),
    ToggleFullscreen,
    SetFullscreen(bool),
    LoadStarted,
    LoadFinished,
    TitleChanged(String),
    Quit,
}

/// Observable state changes published to registered listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KioskEvent {
    Navigated { index: usize, url: String },
    StatusChanged(Status),
    TitleChanged(String),
    StateChanged(CycleState),
    FullscreenChanged(bool),
    UrlListChanged { len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Navigated,
    StatusChanged,
    TitleChanged,
    StateChanged,
    FullscreenChanged,
    UrlListChanged,
}

impl KioskEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            KioskEvent::Navigated { .. } => EventKind::Navigated,
            KioskEvent::StatusChanged(_) => EventKind::StatusChanged,
            KioskEvent::TitleChanged(_) => EventKind::TitleChanged,
            KioskEvent::StateChanged(_) => EventKind::StateChanged,
            KioskEvent::FullscreenChanged(_) => EventKind::FullscreenChanged,
            KioskEvent::UrlListChanged { .. } => EventKind::UrlListChanged,
        }
    }
}
