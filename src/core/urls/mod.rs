//! The cycling list: an ordered set of HTTP(S) endpoints, optionally carrying
//! credentials for HTTP authentication.
//!
//! Entries are validated once, when they cross into the list. A stored
//! [`UrlEntry`] is never edited in place; callers remove and re-insert.

pub mod file;

use percent_encoding::percent_decode_str;
use std::fmt;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("Unsupported scheme '{0}': only http and https can be cycled")]
    UnsupportedScheme(String),
    #[error("URL '{0}' has no host")]
    MissingHost(String),
    #[error("Index {index} out of bounds for a list of {len} URLs")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, UrlError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Scheme::Http => 80,
            Scheme::Https => 443,
        }
    }
}

/// User and password answered to an HTTP authentication challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: Option<String>,
}

/// A single validated endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UrlEntry {
    url: Url,
    scheme: Scheme,
}

impl UrlEntry {
    /// Parses `raw` after trimming surrounding whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    pub fn from_url(url: Url) -> Result<Self> {
        let scheme = match url.scheme() {
            "http" => Scheme::Http,
            "https" => Scheme::Https,
            other => return Err(UrlError::UnsupportedScheme(other.to_string())),
        };

        match url.host_str() {
            Some(host) if !host.is_empty() => {}
            _ => return Err(UrlError::MissingHost(url.to_string())),
        }

        Ok(Self { url, scheme })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.url
            .port()
            .unwrap_or_else(|| self.scheme.default_port())
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.url.fragment()
    }

    pub fn user(&self) -> Option<String> {
        let user = self.url.username();
        if user.is_empty() {
            None
        } else {
            Some(decode(user))
        }
    }

    pub fn password(&self) -> Option<String> {
        self.url.password().map(decode)
    }

    /// Credentials embedded in the URL, if a user name is present.
    pub fn credentials(&self) -> Option<Credentials> {
        self.user().map(|user| Credentials {
            user,
            password: self.password(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        !self.url.username().is_empty() || self.url.password().is_some()
    }

    /// The URL without user and password. This is the form handed to the
    /// display and written to status lines and logs.
    pub fn display_uri(&self) -> String {
        if !self.has_credentials() {
            return self.url.to_string();
        }
        let mut stripped = self.url.clone();
        // http(s) URLs with a host always accept credential changes
        let _ = stripped.set_username("");
        let _ = stripped.set_password(None);
        stripped.to_string()
    }

    pub fn as_url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for UrlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl std::str::FromStr for UrlEntry {
    type Err = UrlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn decode(component: &str) -> String {
    percent_decode_str(component)
        .decode_utf8_lossy()
        .into_owned()
}

/// Where [`UrlList::insert`] places a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Before the entry currently at this index. Indices past the end append.
    At(usize),
    End,
}

impl InsertPosition {
    fn resolve(self, len: usize) -> usize {
        match self {
            InsertPosition::At(index) => index.min(len),
            InsertPosition::End => len,
        }
    }
}

/// Ordered URLs; order is the cycling order and duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlList {
    entries: Vec<UrlEntry>,
}

impl UrlList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&UrlEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UrlEntry> {
        self.entries.iter()
    }

    /// Validates `raw` and inserts it, returning the index it landed at.
    /// Invalid URLs leave the list untouched.
    pub fn insert(&mut self, raw: &str, position: InsertPosition) -> Result<usize> {
        let entry = UrlEntry::parse(raw)?;
        Ok(self.insert_entry(entry, position))
    }

    pub fn insert_entry(&mut self, entry: UrlEntry, position: InsertPosition) -> usize {
        let index = position.resolve(self.entries.len());
        debug!("Inserted URL {} at position {}", entry.display_uri(), index);
        self.entries.insert(index, entry);
        index
    }

    pub fn remove(&mut self, index: usize) -> Result<UrlEntry> {
        if index >= self.entries.len() {
            return Err(UrlError::IndexOutOfBounds {
                index,
                len: self.entries.len(),
            });
        }
        let entry = self.entries.remove(index);
        debug!("Removed URL {} from position {}", entry.display_uri(), index);
        Ok(entry)
    }

    /// Index of the first entry equal to `entry`.
    pub fn position(&self, entry: &UrlEntry) -> Option<usize> {
        self.entries.iter().position(|e| e == entry)
    }
}

impl FromIterator<UrlEntry> for UrlList {
    fn from_iter<I: IntoIterator<Item = UrlEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a UrlList {
    type Item = &'a UrlEntry;
    type IntoIter = std::slice::Iter<'a, UrlEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
