//! Eagle Eye: a kiosk display that cycles through a list of web pages.
//!
//! The [`Kiosk`] session owns the [`SettingsStore`] (preferences and the URL
//! list) and the [`NavigationController`] (cursor, cycle timer and the
//! pause state machine). Hosts feed it [`ShellEvent`]s from a single thread
//! and observe it through [`KioskEvent`] listeners:
//!
//! ```no_run
//! use std::sync::Arc;
//! use eagle_eye::{display::LogDisplay, Kiosk, SettingsStore, ShellEvent};
//!
//! # fn main() -> eagle_eye::Result<()> {
//! let rt = tokio::runtime::Runtime::new().unwrap();
//! let _guard = rt.enter();
//! let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
//! let store = SettingsStore::open_default()?;
//! let mut kiosk = Kiosk::new(
//!     store,
//!     Box::new(LogDisplay::new()),
//!     Arc::new(move |handle| {
//!         let _ = tx.send(ShellEvent::CycleTick(handle));
//!     }),
//! );
//! kiosk.start();
//! while let Some(event) = rx.blocking_recv() {
//!     kiosk.dispatch(event);
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;
use tracing::{info, warn};

pub mod core;
pub mod display;
#[cfg(feature = "windowed")]
pub mod platform;
pub mod settings;

pub use crate::core::cycle::TimerHandle;
pub use crate::core::events::{EventKind, KioskEvent, ShellEvent};
pub use crate::core::navigation::{CycleState, NavigationController, Status, TickSink, APP_NAME};
pub use crate::core::urls::{Credentials, InsertPosition, UrlEntry, UrlError, UrlList};
pub use crate::settings::{Geometry, Settings, SettingsError, SettingsStore, ToolbarSize};

use crate::display::DisplayView;
use crate::settings::validate_cycle_time;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("URL error: {0}")]
    Url(#[from] UrlError),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
    #[error("Platform error: {0}")]
    Platform(String),
}

pub type Result<T> = std::result::Result<T, KioskError>;

/// One running kiosk: durable state plus the cycling state machine.
pub struct Kiosk {
    store: SettingsStore,
    navigation: NavigationController,
    fullscreen: bool,
    quit_requested: bool,
}

impl Kiosk {
    /// Builds a session around `store`, pushing the stored script/plugin
    /// preferences into `display`. Nothing is shown until [`Kiosk::start`].
    pub fn new(store: SettingsStore, display: Box<dyn DisplayView>, ticks: TickSink) -> Self {
        let settings = store.settings();
        let mut navigation = NavigationController::new(display, settings.cycle_interval(), ticks);
        navigation.set_scripts_enabled(!settings.disable_scripts);
        navigation.set_plugins_enabled(!settings.disable_plugins);
        let fullscreen = settings.start_fullscreen;

        Self {
            store,
            navigation,
            fullscreen,
            quit_requested: false,
        }
    }

    pub fn start(&mut self) {
        info!(
            "Starting {} with {} URLs, cycle time {}s",
            APP_NAME,
            self.store.urls().len(),
            self.store.settings().cycle_time
        );
        self.navigation.start(self.store.urls());
    }

    /// Stops cycling and writes everything to disk.
    pub fn shutdown(&mut self) -> Result<()> {
        self.navigation.stop();
        self.store.save()?;
        info!("{} shut down", APP_NAME);
        Ok(())
    }

    /// Routes one host event through the state machine.
    pub fn dispatch(&mut self, event: ShellEvent) {
        match event {
            ShellEvent::CycleTick(handle) => {
                self.navigation.on_timer_fired(handle, self.store.urls())
            }
            ShellEvent::Next => self.next(),
            ShellEvent::Previous => self.previous(),
            ShellEvent::TogglePause => self.toggle_pause(),
            ShellEvent::SetPaused(paused) => self.set_paused(paused),
            ShellEvent::ToggleFullscreen => self.toggle_fullscreen(),
            ShellEvent::SetFullscreen(on) => self.set_fullscreen(on),
            ShellEvent::LoadStarted => self.navigation.on_load_started(),
            ShellEvent::LoadFinished => self.navigation.on_load_finished(),
            ShellEvent::TitleChanged(title) => self.navigation.on_title_changed(&title),
            ShellEvent::Quit => self.quit_requested = true,
        }
    }

    pub fn next(&mut self) {
        self.navigation.next(self.store.urls());
    }

    pub fn previous(&mut self) {
        self.navigation.previous(self.store.urls());
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.navigation.set_paused(paused);
    }

    pub fn toggle_pause(&mut self) {
        self.navigation.toggle_pause();
    }

    pub fn toggle_fullscreen(&mut self) {
        self.set_fullscreen(!self.fullscreen);
    }

    pub fn set_fullscreen(&mut self, on: bool) {
        if self.fullscreen == on {
            return;
        }
        self.fullscreen = on;
        self.navigation.emit(KioskEvent::FullscreenChanged(on));
    }

    pub fn on_http_auth_requested(&self, is_retry: bool) -> Option<Credentials> {
        self.navigation
            .on_http_auth_requested(is_retry, self.store.urls())
    }

    // -------- URL list editing --------

    pub fn insert_url(&mut self, raw: &str, position: InsertPosition) -> Result<usize> {
        let index = self.store.insert_url(raw, position)?;
        self.navigation.on_inserted(index, self.store.urls());
        self.list_changed();
        Ok(index)
    }

    pub fn remove_url(&mut self, index: usize) -> Result<UrlEntry> {
        let entry = self.store.remove_url(index)?;
        self.navigation.on_removed(index, self.store.urls());
        self.list_changed();
        Ok(entry)
    }

    /// Replaces the entry at `index`. The new URL is validated before the old
    /// one is removed, so a bad edit leaves the list unchanged.
    pub fn replace_url(&mut self, index: usize, raw: &str) -> Result<usize> {
        let entry = UrlEntry::parse(raw).inspect_err(|e| {
            warn!("Rejected URL '{}': {}", raw.trim(), e);
        })?;
        self.store.replace_url(index, entry)?;
        self.navigation.on_moved(index, index, self.store.urls());
        self.list_changed();
        Ok(index)
    }

    pub fn move_url(&mut self, from: usize, to: usize) -> Result<usize> {
        let index = self.store.move_url(from, to)?;
        self.navigation.on_moved(from, index, self.store.urls());
        self.list_changed();
        Ok(index)
    }

    fn list_changed(&self) {
        self.navigation.emit(KioskEvent::UrlListChanged {
            len: self.store.urls().len(),
        });
    }

    // -------- Preferences (written through on every change) --------

    pub fn set_cycle_time(&mut self, seconds: u32) -> Result<()> {
        let seconds = validate_cycle_time(i64::from(seconds))?;
        self.store.update(|s| s.cycle_time = seconds);
        self.navigation
            .set_interval(self.store.settings().cycle_interval());
        Ok(())
    }

    pub fn set_start_fullscreen(&mut self, on: bool) {
        self.store.update(|s| s.start_fullscreen = on);
    }

    pub fn set_scripts_disabled(&mut self, disabled: bool) {
        self.store.update(|s| s.disable_scripts = disabled);
        self.navigation.set_scripts_enabled(!disabled);
    }

    pub fn set_plugins_disabled(&mut self, disabled: bool) {
        self.store.update(|s| s.disable_plugins = disabled);
        self.navigation.set_plugins_enabled(!disabled);
    }

    pub fn set_toolbar_size(&mut self, size: ToolbarSize) {
        self.store.update(|s| s.toolbar_size = size);
    }

    pub fn set_remember_geometry(&mut self, on: bool) {
        self.store.update(|s| s.remember_geometry = on);
    }

    /// Records where the window currently sits; persisted only when
    /// geometry is remembered.
    pub fn record_geometry(&mut self, geometry: Geometry) {
        self.store.update(|s| s.geometry = geometry);
    }

    // -------- Observation --------

    pub fn add_listener<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.navigation.add_listener(kind, callback);
    }

    pub fn add_global_listener<F>(&self, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.navigation.add_global_listener(callback);
    }

    pub fn urls(&self) -> &UrlList {
        self.store.urls()
    }

    pub fn settings(&self) -> &Settings {
        self.store.settings()
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn state(&self) -> CycleState {
        self.navigation.state()
    }

    pub fn is_paused(&self) -> bool {
        self.navigation.is_paused()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_cycling(&self) -> bool {
        self.navigation.is_timer_running()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn current_index(&self) -> Option<usize> {
        self.navigation.current_index()
    }

    pub fn current(&self) -> Option<&UrlEntry> {
        self.navigation.current(self.store.urls())
    }

    pub fn status(&self) -> &Status {
        self.navigation.status()
    }

    pub fn title(&self) -> &str {
        self.navigation.title()
    }
}
