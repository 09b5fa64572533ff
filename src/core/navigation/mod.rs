//! The cycling state machine.
//!
//! [`NavigationController`] ties timer ticks, manual navigation, pause/resume
//! and list edits together. It owns the cursor and the timer but never the
//! URL list: every operation that needs entries borrows the list from the
//! settings store, and every list edit is reported back through
//! [`NavigationController::on_inserted`] / [`NavigationController::on_removed`].

use crate::core::cycle::{CycleCursor, CycleTimer, TimerHandle};
use crate::core::events::{EventKind, EventSystem, KioskEvent};
use crate::core::urls::{Credentials, UrlEntry, UrlList};
use crate::display::DisplayView;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const APP_NAME: &str = "Eagle Eye";

/// Where timer ticks are delivered. The host forwards them into its event
/// loop so they are handled on the same thread as everything else.
pub type TickSink = Arc<dyn Fn(TimerHandle) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Running,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => Ok(()),
            Status::Loading(url) => write!(f, "Loading {url}..."),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

pub struct NavigationController {
    state: CycleState,
    started: bool,
    cursor: CycleCursor,
    timer: CycleTimer,
    interval: Duration,
    ticks: TickSink,
    display: Box<dyn DisplayView>,
    events: EventSystem,
    status: Status,
    title: String,
}

impl NavigationController {
    pub fn new(display: Box<dyn DisplayView>, interval: Duration, ticks: TickSink) -> Self {
        Self {
            state: CycleState::Running,
            started: false,
            cursor: CycleCursor::new(),
            timer: CycleTimer::new(),
            interval,
            ticks,
            display,
            events: EventSystem::new(),
            status: Status::Idle,
            title: APP_NAME.to_string(),
        }
    }

    /// Shows the first URL and arms the timer. With an empty list the
    /// controller stays idle until an entry is inserted.
    pub fn start(&mut self, urls: &UrlList) {
        self.started = true;
        self.cursor = CycleCursor::at_start(urls.len());
        if self.cursor.is_empty() {
            info!("URL list is empty; waiting for a URL to be added");
            return;
        }
        self.show_current(urls);
        if self.state == CycleState::Running {
            self.arm_timer();
        }
    }

    /// Stops the timer for good; further ticks are ignored.
    pub fn stop(&mut self) {
        self.timer.stop_active();
        self.started = false;
    }

    pub fn on_timer_fired(&mut self, handle: TimerHandle, urls: &UrlList) {
        if !self.timer.is_current(handle) {
            debug!("Ignoring stale tick from cycle timer {}", handle.id());
            return;
        }
        if self.state != CycleState::Running {
            return;
        }
        if self.cursor.next(urls).is_some() {
            self.show_current(urls);
        } else {
            self.timer.stop_active();
        }
    }

    pub fn next(&mut self, urls: &UrlList) {
        self.navigate(Direction::Forward, urls);
    }

    pub fn previous(&mut self, urls: &UrlList) {
        self.navigate(Direction::Backward, urls);
    }

    // A manual jump restarts the dwell clock for the page it lands on. While
    // paused the timer stays off.
    fn navigate(&mut self, direction: Direction, urls: &UrlList) {
        if !self.started {
            return;
        }
        let rearm = self.state == CycleState::Running;
        self.timer.stop_active();

        let moved = match direction {
            Direction::Forward => self.cursor.next(urls),
            Direction::Backward => self.cursor.previous(urls),
        };
        if moved.is_none() {
            debug!("Navigation ignored: URL list is empty");
            return;
        }

        self.show_current(urls);
        if rearm {
            self.arm_timer();
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        match (self.state, paused) {
            (CycleState::Running, true) => {
                self.timer.stop_active();
                self.state = CycleState::Paused;
                info!("Cycling paused");
            }
            (CycleState::Paused, false) => {
                self.state = CycleState::Running;
                if self.started && !self.cursor.is_empty() {
                    self.arm_timer();
                }
                info!("Cycling resumed");
            }
            _ => return,
        }
        self.events.dispatch(&KioskEvent::StateChanged(self.state));
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(self.state == CycleState::Running);
    }

    /// Changes the dwell interval. A running timer restarts with a full
    /// interval of the new length.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        if self.timer.is_running() {
            self.arm_timer();
        }
    }

    /// Must be called after `urls` gained an entry at `index`. The edit
    /// itself never triggers a load, except when it ends an idle stretch on
    /// an empty list.
    pub fn on_inserted(&mut self, index: usize, urls: &UrlList) {
        let was_empty = self.cursor.is_empty();
        self.cursor.on_insert(index, urls.len());

        if self.started && was_empty && !self.cursor.is_empty() {
            info!("URL list no longer empty; cycling from the first URL");
            self.show_current(urls);
            if self.state == CycleState::Running {
                self.arm_timer();
            }
        }
    }

    /// Must be called after the entry at `index` was removed from `urls`.
    pub fn on_removed(&mut self, index: usize, urls: &UrlList) {
        self.cursor.on_remove(index, urls.len());
        if self.cursor.is_empty() && self.timer.is_running() {
            self.timer.stop_active();
            info!("URL list is empty; cycling suspended");
        }
    }

    /// Must be called after a single edit took the entry at `from` out of
    /// `urls` and put one back at `to` (a replace or a move).
    pub fn on_moved(&mut self, from: usize, to: usize, urls: &UrlList) {
        self.cursor.on_move(from, to, urls.len());
    }

    pub fn on_load_started(&mut self) {
        debug!("Load started");
    }

    pub fn on_load_finished(&mut self) {
        debug!("Load finished");
        self.set_status(Status::Idle);
    }

    pub fn on_title_changed(&mut self, page_title: &str) {
        let page_title = page_title.trim();
        self.title = if page_title.is_empty() {
            APP_NAME.to_string()
        } else {
            format!("{APP_NAME} - {page_title}")
        };
        self.events
            .dispatch(&KioskEvent::TitleChanged(self.title.clone()));
    }

    /// Answers an authentication challenge for the page being shown. Only the
    /// first attempt is answered; a retry means the credentials were
    /// rejected and the load is left to fail.
    pub fn on_http_auth_requested(&self, is_retry: bool, urls: &UrlList) -> Option<Credentials> {
        let entry = self.cursor.current(urls)?;
        if is_retry {
            warn!(
                "HTTP authentication rejected for {}; not retrying",
                entry.display_uri()
            );
            return None;
        }
        let credentials = entry.credentials();
        if credentials.is_some() {
            debug!("Answering HTTP authentication for {}", entry.host());
        } else {
            debug!("No credentials stored for {}", entry.display_uri());
        }
        credentials
    }

    pub fn set_scripts_enabled(&mut self, enabled: bool) {
        self.display.set_scripts_enabled(enabled);
    }

    pub fn set_plugins_enabled(&mut self, enabled: bool) {
        self.display.set_plugins_enabled(enabled);
    }

    pub fn add_listener<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.events.add_listener(kind, callback);
    }

    pub fn add_global_listener<F>(&self, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.events.add_global_listener(callback);
    }

    pub(crate) fn emit(&self, event: KioskEvent) {
        self.events.dispatch(&event);
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == CycleState::Paused
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor.index()
    }

    pub fn current<'a>(&self, urls: &'a UrlList) -> Option<&'a UrlEntry> {
        self.cursor.current(urls)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    fn show_current(&mut self, urls: &UrlList) {
        let (Some(index), Some(entry)) = (self.cursor.index(), self.cursor.current(urls)) else {
            return;
        };
        let uri = entry.display_uri();
        info!("Showing [{}] {}", index, uri);
        self.set_status(Status::Loading(uri.clone()));
        self.display.load_uri(&uri);
        self.events
            .dispatch(&KioskEvent::Navigated { index, url: uri });
    }

    fn set_status(&mut self, status: Status) {
        if self.status == status {
            return;
        }
        self.status = status;
        self.events
            .dispatch(&KioskEvent::StatusChanged(self.status.clone()));
    }

    fn arm_timer(&mut self) {
        let ticks = self.ticks.clone();
        self.timer.start(self.interval, move |handle| ticks(handle));
    }
}
