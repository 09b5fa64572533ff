//! The kiosk core: URL list, cycle cursor and timer, navigation state
//! machine, and the event types connecting them to hosts.

pub mod cycle;
pub mod events;
pub mod navigation;
pub mod urls;
