//! The embedded web view, seen from the kiosk side.
//!
//! Rendering, networking, cookies and authentication handshakes live behind
//! [`DisplayView`]. The view reports its load lifecycle back to the kiosk as
//! [`ShellEvent`](crate::core::events::ShellEvent)s and asks for credentials
//! through [`Kiosk::on_http_auth_requested`](crate::Kiosk::on_http_auth_requested).

pub use crate::core::urls::Credentials;

use tracing::info;

pub trait DisplayView: Send {
    /// Begins navigation to `uri`. Failures are reported by the view itself.
    fn load_uri(&mut self, uri: &str);

    fn set_scripts_enabled(&mut self, enabled: bool);

    fn set_plugins_enabled(&mut self, enabled: bool);
}

impl<T: DisplayView + ?Sized> DisplayView for Box<T> {
    fn load_uri(&mut self, uri: &str) {
        (**self).load_uri(uri)
    }

    fn set_scripts_enabled(&mut self, enabled: bool) {
        (**self).set_scripts_enabled(enabled)
    }

    fn set_plugins_enabled(&mut self, enabled: bool) {
        (**self).set_plugins_enabled(enabled)
    }
}

/// A view with no rendering surface that records what it was asked to show.
/// Used by the headless host.
#[derive(Debug, Default)]
pub struct LogDisplay {
    current: Option<String>,
    loads: u64,
    scripts_enabled: bool,
    plugins_enabled: bool,
}

impl LogDisplay {
    pub fn new() -> Self {
        Self {
            scripts_enabled: true,
            plugins_enabled: true,
            ..Default::default()
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn loads(&self) -> u64 {
        self.loads
    }
}

impl DisplayView for LogDisplay {
    fn load_uri(&mut self, uri: &str) {
        self.loads += 1;
        info!(
            scripts = self.scripts_enabled,
            plugins = self.plugins_enabled,
            "Displaying {}",
            uri
        );
        self.current = Some(uri.to_string());
    }

    fn set_scripts_enabled(&mut self, enabled: bool) {
        self.scripts_enabled = enabled;
    }

    fn set_plugins_enabled(&mut self, enabled: bool) {
        self.plugins_enabled = enabled;
    }
}
