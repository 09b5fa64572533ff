//! Durable configuration: preferences, the URL list and window geometry.

pub mod config;
pub mod geometry;
pub mod store;

pub use geometry::Geometry;
pub use store::{ConfigPaths, SettingsStore};

use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CYCLE_TIME: u32 = 30;
pub const MIN_CYCLE_TIME: u32 = 1;
pub const MAX_CYCLE_TIME: u32 = 86_400;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot locate the home directory")]
    NoHomeDir,
    #[error("Cannot create configuration directory {path}: {source}")]
    ConfigDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolbarSize {
    Small,
    #[default]
    Large,
}

impl ToolbarSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolbarSize::Small => "small",
            ToolbarSize::Large => "large",
        }
    }
}

impl std::str::FromStr for ToolbarSize {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(ToolbarSize::Small),
            "large" => Ok(ToolbarSize::Large),
            other => Err(SettingsError::InvalidValue {
                key: "toolbar-size".to_string(),
                reason: format!("'{other}' is not one of small, large"),
            }),
        }
    }
}

/// Preferences persisted in the `[main]` table of the config file, plus the
/// window geometry kept in its own file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Dwell time per page, in seconds.
    pub cycle_time: u32,
    pub start_fullscreen: bool,
    pub disable_plugins: bool,
    pub disable_scripts: bool,
    pub toolbar_size: ToolbarSize,
    pub remember_geometry: bool,
    pub cookies_file: PathBuf,
    pub geometry: Geometry,
}

impl Settings {
    pub fn with_cookies_file(cookies_file: PathBuf) -> Self {
        Self {
            cycle_time: DEFAULT_CYCLE_TIME,
            start_fullscreen: false,
            disable_plugins: false,
            disable_scripts: false,
            toolbar_size: ToolbarSize::default(),
            remember_geometry: false,
            cookies_file,
            geometry: Geometry::default(),
        }
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.cycle_time))
    }
}

pub fn validate_cycle_time(seconds: i64) -> Result<u32> {
    u32::try_from(seconds)
        .ok()
        .filter(|s| (MIN_CYCLE_TIME..=MAX_CYCLE_TIME).contains(s))
        .ok_or_else(|| SettingsError::InvalidValue {
            key: "cycle-time".to_string(),
            reason: format!(
                "{seconds} is outside {MIN_CYCLE_TIME}..={MAX_CYCLE_TIME} seconds"
            ),
        })
}
