//! Windowed host built on winit.
//!
//! winit owns the main thread; cycle-timer ticks arrive from the tokio
//! runtime as user events through an [`EventLoopProxy`], so every state
//! transition still runs on the event-loop thread.

mod window;

pub use window::KioskWindow;

use crate::core::events::ShellEvent;
use crate::core::navigation::TickSink;
use crate::display::DisplayView;
use crate::settings::SettingsStore;
use crate::{Kiosk, KioskError};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy};
use winit::keyboard::{Key, NamedKey};

#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("Event loop failed: {0}")]
    EventLoop(String),
    #[error("Window creation failed: {0}")]
    WindowCreationFailed(String),
}

impl From<PlatformError> for KioskError {
    fn from(e: PlatformError) -> Self {
        KioskError::Platform(e.to_string())
    }
}

/// Keyboard shortcuts of the kiosk window.
pub fn key_action(key: &Key) -> Option<ShellEvent> {
    match key {
        Key::Named(NamedKey::ArrowRight | NamedKey::PageDown) => Some(ShellEvent::Next),
        Key::Named(NamedKey::ArrowLeft | NamedKey::PageUp) => Some(ShellEvent::Previous),
        Key::Named(NamedKey::Space) => Some(ShellEvent::TogglePause),
        Key::Named(NamedKey::F11) => Some(ShellEvent::ToggleFullscreen),
        Key::Named(NamedKey::Escape) => Some(ShellEvent::SetFullscreen(false)),
        Key::Character(c) if c.eq_ignore_ascii_case("q") => Some(ShellEvent::Quit),
        _ => None,
    }
}

fn tick_sink(proxy: EventLoopProxy<ShellEvent>) -> TickSink {
    let proxy = Mutex::new(proxy);
    Arc::new(move |handle| {
        // Fails only once the loop is gone, when ticks no longer matter.
        let _ = proxy.lock().send_event(ShellEvent::CycleTick(handle));
    })
}

/// Opens the kiosk window and runs until it is closed. Must be called on
/// the main thread from within a tokio runtime context.
pub fn run_windowed(store: SettingsStore, display: Box<dyn DisplayView>) -> Result<(), PlatformError> {
    let event_loop = EventLoopBuilder::<ShellEvent>::with_user_event()
        .build()
        .map_err(|e| PlatformError::EventLoop(e.to_string()))?;

    let window = KioskWindow::new(&event_loop, store.settings())?;
    let mut kiosk = Kiosk::new(store, display, tick_sink(event_loop.create_proxy()));
    window.attach(&kiosk);
    kiosk.start();

    let mut last_geometry = None;
    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            match event {
                Event::UserEvent(shell_event) => kiosk.dispatch(shell_event),
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::CloseRequested => elwt.exit(),
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                logical_key,
                                state: ElementState::Pressed,
                                repeat: false,
                                ..
                            },
                        ..
                    } => {
                        if let Some(action) = key_action(&logical_key) {
                            kiosk.dispatch(action);
                        }
                    }
                    WindowEvent::Resized(_) | WindowEvent::Moved(_) => {
                        if !window.is_fullscreen() {
                            last_geometry = Some(window.geometry());
                        }
                    }
                    _ => {}
                },
                Event::LoopExiting => {
                    if let Some(geometry) = last_geometry.take() {
                        kiosk.record_geometry(geometry);
                    }
                    if let Err(e) = kiosk.shutdown() {
                        error!("Failed to save settings on exit: {}", e);
                    }
                    info!("Window closed");
                }
                _ => {}
            }
            if kiosk.quit_requested() {
                elwt.exit();
            }
        })
        .map_err(|e| PlatformError::EventLoop(e.to_string()))
}
