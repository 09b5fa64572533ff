use super::config::{apply_config, render_config};
use super::{Geometry, Result, Settings, SettingsError};
use crate::core::urls::file::{parse_url_list, render_url_list};
use crate::core::urls::{self, InsertPosition, UrlEntry, UrlList};
use std::borrow::Cow;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CONFIG_DIR_NAME: &str = ".eagle-eye";

/// Files kept in the configuration directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub dir: PathBuf,
    pub config: PathBuf,
    pub urls: PathBuf,
    pub geometry: PathBuf,
    pub cookies: PathBuf,
}

impl ConfigPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            config: dir.join("config"),
            urls: dir.join("urls"),
            geometry: dir.join("geometry"),
            cookies: dir.join("cookies"),
            dir,
        }
    }

    /// `$HOME/.eagle-eye`
    pub fn default_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(CONFIG_DIR_NAME))
            .ok_or(SettingsError::NoHomeDir)
    }
}

/// Owner of the durable state. Every mutation is written through to disk;
/// write failures are logged and leave the in-memory state authoritative.
///
/// A file that could not be loaded in full (unreadable, undecodable lines,
/// malformed keys) is never rewritten by [`SettingsStore::save`]; only an
/// explicit edit of what it holds replaces it.
pub struct SettingsStore {
    paths: ConfigPaths,
    settings: Settings,
    urls: UrlList,
    config_in_sync: bool,
    urls_in_sync: bool,
}

impl SettingsStore {
    /// Opens `dir`, creating it if needed, and loads its contents. Failing to
    /// create the directory is the only error; everything else falls back to
    /// defaults.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let paths = ConfigPaths::new(dir);
        fs::create_dir_all(&paths.dir).map_err(|source| SettingsError::ConfigDir {
            path: paths.dir.clone(),
            source,
        })?;

        let mut store = Self {
            settings: Settings::with_cookies_file(paths.cookies.clone()),
            urls: UrlList::new(),
            paths,
            config_in_sync: false,
            urls_in_sync: false,
        };
        store.load();
        Ok(store)
    }

    pub fn open_default() -> Result<Self> {
        Self::open(ConfigPaths::default_dir()?)
    }

    /// Re-reads all files. Missing files are created from defaults.
    pub fn load(&mut self) {
        let mut settings = Settings::with_cookies_file(self.paths.cookies.clone());

        let config = read_file(&self.paths.config);
        self.config_in_sync = match &config {
            FileRead::Missing => true,
            FileRead::Unreadable => false,
            FileRead::Contents(bytes) => {
                let contents = String::from_utf8_lossy(bytes);
                let lossless = matches!(contents, Cow::Borrowed(_));
                if !lossless {
                    warn!("{} is not valid UTF-8", self.paths.config.display());
                }
                match apply_config(&contents, &self.paths.config, &mut settings) {
                    Ok(load) => lossless && load.is_clean(),
                    Err(e) => {
                        warn!("{}; using default settings", e);
                        false
                    }
                }
            }
        };

        let urls = read_file(&self.paths.urls);
        self.urls_in_sync = match &urls {
            FileRead::Missing => {
                self.urls = UrlList::new();
                true
            }
            FileRead::Unreadable => {
                self.urls = UrlList::new();
                false
            }
            FileRead::Contents(bytes) => {
                let parsed = parse_url_list(bytes);
                let complete = parsed.is_complete();
                self.urls = parsed.urls;
                complete
            }
        };

        if settings.remember_geometry {
            if let FileRead::Contents(bytes) = read_file(&self.paths.geometry) {
                match String::from_utf8_lossy(&bytes).parse::<Geometry>() {
                    Ok(geometry) => settings.geometry = geometry,
                    Err(e) => warn!("{}: {}; using default geometry", self.paths.geometry.display(), e),
                }
            }
        }

        self.settings = settings;
        info!(
            "Loaded settings from {} ({} URLs, cycle time {}s)",
            self.paths.dir.display(),
            self.urls.len(),
            self.settings.cycle_time
        );
        if !self.config_in_sync {
            warn!(
                "{} was not fully understood; it is kept as is until a preference is changed",
                self.paths.config.display()
            );
        }
        if !self.urls_in_sync {
            warn!(
                "{} was not fully understood; it is kept as is until the list is edited",
                self.paths.urls.display()
            );
        }

        if matches!(config, FileRead::Missing) {
            self.persist_config();
        }
        if matches!(urls, FileRead::Missing) {
            self.persist_urls();
        }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn urls(&self) -> &UrlList {
        &self.urls
    }

    /// Whether the config file holds exactly what is in memory.
    pub fn config_in_sync(&self) -> bool {
        self.config_in_sync
    }

    /// Whether the URL file holds exactly what is in memory.
    pub fn urls_in_sync(&self) -> bool {
        self.urls_in_sync
    }

    /// Validates and inserts a URL, then writes the URL file.
    pub fn insert_url(&mut self, raw: &str, position: InsertPosition) -> urls::Result<usize> {
        let index = self.urls.insert(raw, position).inspect_err(|e| {
            warn!("Rejected URL '{}': {}", raw.trim(), e);
        })?;
        self.persist_urls();
        Ok(index)
    }

    pub fn insert_entry(&mut self, entry: UrlEntry, position: InsertPosition) -> usize {
        let index = self.urls.insert_entry(entry, position);
        self.persist_urls();
        index
    }

    pub fn remove_url(&mut self, index: usize) -> urls::Result<UrlEntry> {
        let entry = self.urls.remove(index).inspect_err(|e| {
            warn!("Cannot remove URL: {}", e);
        })?;
        self.persist_urls();
        Ok(entry)
    }

    /// Puts `entry` in place of the one at `index` with a single write.
    /// Returns the entry that was replaced.
    pub fn replace_url(&mut self, index: usize, entry: UrlEntry) -> urls::Result<UrlEntry> {
        let old = self.urls.remove(index).inspect_err(|e| {
            warn!("Cannot replace URL: {}", e);
        })?;
        self.urls.insert_entry(entry, InsertPosition::At(index));
        self.persist_urls();
        Ok(old)
    }

    /// Moves the entry at `from` so it sits at `to` afterwards (clamped to
    /// the end), with a single write. Returns its new index.
    pub fn move_url(&mut self, from: usize, to: usize) -> urls::Result<usize> {
        let entry = self.urls.remove(from).inspect_err(|e| {
            warn!("Cannot move URL: {}", e);
        })?;
        let index = self.urls.insert_entry(entry, InsertPosition::At(to));
        self.persist_urls();
        Ok(index)
    }

    /// Applies `mutate` to the preferences and writes them through. The
    /// config file is only rewritten when a key it holds changed.
    pub fn update<F>(&mut self, mutate: F)
    where
        F: FnOnce(&mut Settings),
    {
        let before = self.settings.clone();
        mutate(&mut self.settings);
        if self.settings == before {
            return;
        }
        let geometry_changed = self.settings.geometry != before.geometry;
        let config_changed = Settings {
            geometry: self.settings.geometry,
            ..before
        } != self.settings;

        if config_changed {
            self.persist_config();
        }
        if self.settings.remember_geometry && geometry_changed {
            self.persist_geometry();
        }
    }

    /// Replaces the geometry for this session only, e.g. from the command line.
    pub fn override_geometry(&mut self, geometry: Geometry) {
        self.settings.geometry = geometry;
    }

    /// Writes every file whose contents are fully known. Files that were
    /// only partly understood at load time and not edited since are left
    /// alone.
    pub fn save(&mut self) -> Result<()> {
        if self.config_in_sync {
            self.save_config()?;
        } else {
            debug!("Leaving {} untouched", self.paths.config.display());
        }
        if self.urls_in_sync {
            self.save_urls()?;
        } else {
            debug!("Leaving {} untouched", self.paths.urls.display());
        }
        if self.settings.remember_geometry {
            self.save_geometry()?;
        }
        Ok(())
    }

    pub fn save_config(&mut self) -> Result<()> {
        write_file(&self.paths.config, &render_config(&self.settings)?)?;
        self.config_in_sync = true;
        Ok(())
    }

    pub fn save_urls(&mut self) -> Result<()> {
        write_file(&self.paths.urls, &render_url_list(&self.urls))?;
        self.urls_in_sync = true;
        Ok(())
    }

    pub fn save_geometry(&self) -> Result<()> {
        write_file(&self.paths.geometry, &format!("{}\n", self.settings.geometry))
    }

    fn persist_config(&mut self) {
        if let Err(e) = self.save_config() {
            warn!("Settings not saved: {}", e);
        }
    }

    fn persist_urls(&mut self) {
        if let Err(e) = self.save_urls() {
            warn!("URL list not saved: {}", e);
        }
    }

    fn persist_geometry(&self) {
        if let Err(e) = self.save_geometry() {
            warn!("Window geometry not saved: {}", e);
        }
    }
}

enum FileRead {
    Missing,
    Unreadable,
    Contents(Vec<u8>),
}

/// Reads a file that may legitimately be absent. Other read errors are
/// logged and reported as [`FileRead::Unreadable`].
fn read_file(path: &Path) -> FileRead {
    match fs::read(path) {
        Ok(bytes) => FileRead::Contents(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!("{} not found; creating it with defaults", path.display());
            FileRead::Missing
        }
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            FileRead::Unreadable
        }
    }
}

// Write beside the target and rename so a crash never leaves a torn file.
fn write_file(path: &Path, contents: &str) -> Result<()> {
    let io_err = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents).map_err(io_err)?;
    fs::rename(&tmp, path).map_err(io_err)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
