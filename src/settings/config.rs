//! The `config` file: a TOML document with a single `[main]` table.
//!
//! ```toml
//! [main]
//! cycle-time = 30
//! start-fullscreen = false
//! disable-plugins = false
//! disable-scripts = false
//! toolbar-size = "large"
//! remember-geometry = false
//! cookies-file = "/home/kiosk/.eagle-eye/cookies"
//! ```

use super::{validate_cycle_time, Result, Settings, SettingsError, ToolbarSize};
use serde::Serialize;
use std::path::{Path, PathBuf};
use toml::{Table, Value};
use tracing::{debug, warn};

pub const SECTION: &str = "main";

const KEYS: [&str; 7] = [
    "cycle-time",
    "start-fullscreen",
    "disable-plugins",
    "disable-scripts",
    "toolbar-size",
    "remember-geometry",
    "cookies-file",
];

#[derive(Serialize)]
struct ConfigFile<'a> {
    main: MainSection<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct MainSection<'a> {
    cycle_time: u32,
    start_fullscreen: bool,
    disable_plugins: bool,
    disable_scripts: bool,
    toolbar_size: ToolbarSize,
    remember_geometry: bool,
    cookies_file: &'a Path,
}

pub fn render_config(settings: &Settings) -> Result<String> {
    let file = ConfigFile {
        main: MainSection {
            cycle_time: settings.cycle_time,
            start_fullscreen: settings.start_fullscreen,
            disable_plugins: settings.disable_plugins,
            disable_scripts: settings.disable_scripts,
            toolbar_size: settings.toolbar_size,
            remember_geometry: settings.remember_geometry,
            cookies_file: &settings.cookies_file,
        },
    };
    toml::to_string_pretty(&file).map_err(|e| SettingsError::Serialize(e.to_string()))
}

/// What [`apply_config`] made of a config document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLoad {
    /// Keys that were present but malformed and kept their previous value.
    pub rejected: Vec<String>,
    /// Keys in `[main]` that this version does not know.
    pub unknown: Vec<String>,
    /// The document was not valid TOML and `[main]` was read line by line.
    pub recovered: bool,
}

impl ConfigLoad {
    /// Every key in the file was understood, so rewriting it loses nothing.
    pub fn is_clean(&self) -> bool {
        !self.recovered && self.rejected.is_empty() && self.unknown.is_empty()
    }
}

/// Reads `contents` (loaded from `path`) over `settings`, key by key.
///
/// A key that is present but malformed is logged and left at its current
/// value without affecting the other keys. When the document as a whole is
/// not TOML (e.g. bare `toolbar-size = small` values), the `[main]` section
/// is read one `key = value` line at a time instead. Only a document with
/// no `[main]` section at all is an error, and it changes nothing.
pub fn apply_config(contents: &str, path: &Path, settings: &mut Settings) -> Result<ConfigLoad> {
    let mut load = ConfigLoad::default();
    let main = match toml::from_str::<Table>(contents) {
        Ok(mut table) => match table.remove(SECTION) {
            Some(Value::Table(main)) => main,
            _ => {
                warn!("{} has no [{}] table; using defaults", path.display(), SECTION);
                load.recovered = true;
                return Ok(load);
            }
        },
        Err(e) => {
            let Some(main) = recover_section(contents) else {
                return Err(SettingsError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                });
            };
            warn!(
                "{} is not valid TOML ({}); reading [{}] line by line",
                path.display(),
                e.message(),
                SECTION
            );
            load.recovered = true;
            main
        }
    };

    for key in main.keys() {
        if !KEYS.contains(&key.as_str()) {
            warn!("{}: ignoring unknown key '{}'", path.display(), key);
            load.unknown.push(key.clone());
        }
    }

    let rejected = &mut load.rejected;
    let mut read = |key: &str, apply: &mut dyn FnMut(&Value) -> std::result::Result<(), String>| {
        let Some(value) = main.get(key) else {
            debug!("{}: '{}' not set, keeping default", path.display(), key);
            return;
        };
        if let Err(reason) = apply(value) {
            warn!(
                "{}: ignoring '{}' ({}); keeping default",
                path.display(),
                key,
                reason
            );
            rejected.push(key.to_string());
        }
    };

    read("cycle-time", &mut |v| {
        let seconds = v.as_integer().ok_or("expected an integer")?;
        settings.cycle_time = validate_cycle_time(seconds).map_err(|e| e.to_string())?;
        Ok(())
    });
    read("start-fullscreen", &mut |v| {
        settings.start_fullscreen = as_bool(v)?;
        Ok(())
    });
    read("disable-plugins", &mut |v| {
        settings.disable_plugins = as_bool(v)?;
        Ok(())
    });
    read("disable-scripts", &mut |v| {
        settings.disable_scripts = as_bool(v)?;
        Ok(())
    });
    read("toolbar-size", &mut |v| {
        let name = v.as_str().ok_or("expected a string")?;
        settings.toolbar_size = name.parse().map_err(|e: SettingsError| e.to_string())?;
        Ok(())
    });
    read("remember-geometry", &mut |v| {
        settings.remember_geometry = as_bool(v)?;
        Ok(())
    });
    read("cookies-file", &mut |v| {
        let raw = v.as_str().ok_or("expected a path string")?.trim();
        if raw.is_empty() {
            return Err("path is empty".to_string());
        }
        settings.cookies_file = resolve_relative(path, raw);
        Ok(())
    });

    Ok(load)
}

/// Pulls the `[main]` section out of a document that is not valid TOML.
/// Each value is read as TOML if it parses on its own line, otherwise as a
/// bare string. `None` when there is no `[main]` header.
fn recover_section(contents: &str) -> Option<Table> {
    let mut main = None;
    let mut in_main = false;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_main = line.trim_start_matches('[').trim_end_matches(']').trim() == SECTION;
            if in_main {
                main.get_or_insert_with(Table::new);
            }
            continue;
        }
        let (Some(table), true) = (main.as_mut(), in_main) else {
            continue;
        };
        let Some((key, raw)) = line.split_once('=') else {
            continue;
        };
        let raw = raw.trim();
        let value = toml::from_str::<Table>(&format!("v = {raw}"))
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| Value::String(raw.to_string()));
        table.insert(key.trim().to_string(), value);
    }
    main
}

fn as_bool(value: &Value) -> std::result::Result<bool, String> {
    value
        .as_bool()
        .ok_or_else(|| "expected true or false".to_string())
}

fn resolve_relative(config_path: &Path, raw: &str) -> PathBuf {
    let candidate = PathBuf::from(raw);
    match config_path.parent() {
        Some(dir) if candidate.is_relative() => dir.join(candidate),
        _ => candidate,
    }
}
