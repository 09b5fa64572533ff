use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Identifies one scheduled run of the cycle timer.
///
/// Ticks carry the handle of the run that produced them, so a tick that was
/// already queued when its run got stopped can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct ActiveRun {
    handle: TimerHandle,
    task: JoinHandle<()>,
}

/// Periodic trigger for auto-advance. At most one run is outstanding.
///
/// Runs are tokio tasks, so [`CycleTimer::start`] must be called from within
/// a runtime context.
pub struct CycleTimer {
    active: Option<ActiveRun>,
    next_id: u64,
}

impl CycleTimer {
    pub fn new() -> Self {
        Self {
            active: None,
            next_id: 1,
        }
    }

    /// Schedules `on_fire` every `interval`, first after one full interval.
    /// Any run already outstanding is stopped first.
    ///
    /// Ticks follow a fixed period measured from the start instant, not from
    /// the completion of the previous callback.
    pub fn start<F>(&mut self, interval: Duration, on_fire: F) -> TimerHandle
    where
        F: Fn(TimerHandle) + Send + 'static,
    {
        self.stop_active();

        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let period = interval.max(Duration::from_millis(1));
        // Taken here rather than inside the task so the first deadline does
        // not drift by however long the task waits to be polled.
        let first = Instant::now() + period;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                on_fire(handle);
            }
        });

        debug!("Cycle timer {} started, period {:?}", handle.0, period);
        self.active = Some(ActiveRun { handle, task });
        handle
    }

    /// Cancels `handle`. Stopping a handle that is not the active run is a
    /// no-op.
    pub fn stop(&mut self, handle: TimerHandle) {
        if self.is_current(handle) {
            self.stop_active();
        }
    }

    pub fn stop_active(&mut self) {
        if let Some(run) = self.active.take() {
            run.task.abort();
            debug!("Cycle timer {} stopped", run.handle.0);
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, handle: TimerHandle) -> bool {
        self.active.as_ref().is_some_and(|run| run.handle == handle)
    }

    pub fn active_handle(&self) -> Option<TimerHandle> {
        self.active.as_ref().map(|run| run.handle)
    }
}

impl Default for CycleTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CycleTimer {
    fn drop(&mut self) {
        self.stop_active();
    }
}
