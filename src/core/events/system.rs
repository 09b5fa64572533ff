use super::*;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

pub type EventCallback = Arc<dyn Fn(&KioskEvent) + Send + Sync>;

/// Listener registry. Listeners run synchronously, in registration order,
/// on the thread that emits the event.
pub struct EventSystem {
    kind_handlers: RwLock<HashMap<EventKind, Vec<EventCallback>>>,
    global_handlers: RwLock<Vec<EventCallback>>,
}

impl EventSystem {
    pub fn new() -> Self {
        Self {
            kind_handlers: RwLock::new(HashMap::new()),
            global_handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn add_listener<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.kind_handlers
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(callback));
    }

    /// Registers a listener for every event kind.
    pub fn add_global_listener<F>(&self, callback: F)
    where
        F: Fn(&KioskEvent) + Send + Sync + 'static,
    {
        self.global_handlers.write().push(Arc::new(callback));
    }

    pub fn dispatch(&self, event: &KioskEvent) {
        // Snapshot so a listener may register further listeners.
        let callbacks: Vec<EventCallback> = {
            let by_kind = self.kind_handlers.read();
            let global = self.global_handlers.read();
            by_kind
                .get(&event.kind())
                .into_iter()
                .flatten()
                .chain(global.iter())
                .cloned()
                .collect()
        };
        for callback in callbacks {
            callback(event);
        }
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}
