use crate::core::urls::{UrlEntry, UrlList};
use tracing::debug;

/// Index of the displayed entry within a [`UrlList`].
///
/// The cursor never holds entries, only a position. Every list mutation must
/// be reported through [`CycleCursor::on_insert`] or [`CycleCursor::on_remove`]
/// so the position keeps naming the same entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCursor {
    index: Option<usize>,
}

impl CycleCursor {
    /// An empty cursor.
    pub fn new() -> Self {
        Self::default()
    }

    /// A cursor at index 0 of a list of `len` entries, or empty.
    pub fn at_start(len: usize) -> Self {
        Self {
            index: (len > 0).then_some(0),
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_none()
    }

    pub fn current<'a>(&self, urls: &'a UrlList) -> Option<&'a UrlEntry> {
        self.index.and_then(|i| urls.get(i))
    }

    /// Moves to the successor, wrapping from the last entry to the first.
    pub fn next<'a>(&mut self, urls: &'a UrlList) -> Option<&'a UrlEntry> {
        let len = urls.len();
        self.index = match (self.index, len) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), _) => Some((i + 1) % len),
        };
        self.current(urls)
    }

    /// Moves to the predecessor, wrapping from the first entry to the last.
    pub fn previous<'a>(&mut self, urls: &'a UrlList) -> Option<&'a UrlEntry> {
        let len = urls.len();
        self.index = match (self.index, len) {
            (_, 0) => None,
            (None, _) => Some(len - 1),
            (Some(i), _) => Some((i.min(len - 1) + len - 1) % len),
        };
        self.current(urls)
    }

    /// Re-validates after an entry was inserted at `index`; `new_len` is the
    /// list length after the insertion.
    pub fn on_insert(&mut self, index: usize, new_len: usize) {
        self.index = match self.index {
            None if new_len > 0 => Some(0),
            Some(current) if index <= current => Some(current + 1),
            other => other,
        };
        debug!("Cursor after insert at {}: {:?}", index, self.index);
    }

    /// Re-validates after the entry at `index` was removed; `new_len` is the
    /// list length after the removal.
    pub fn on_remove(&mut self, index: usize, new_len: usize) {
        self.index = match self.index {
            _ if new_len == 0 => None,
            Some(current) if index <= current => Some(current.saturating_sub(1)),
            Some(current) => Some(current.min(new_len - 1)),
            None => None,
        };
        debug!("Cursor after remove at {}: {:?}", index, self.index);
    }

    /// Re-validates after the entry at `from` was taken out and an entry put
    /// back at `to` in one edit; `len` is the unchanged list length. A cursor
    /// on `from` follows the edited entry.
    pub fn on_move(&mut self, from: usize, to: usize, len: usize) {
        match self.index {
            Some(current) if current == from => self.index = Some(to.min(len.saturating_sub(1))),
            Some(_) => {
                self.on_remove(from, len.saturating_sub(1));
                self.on_insert(to, len);
            }
            None => {}
        }
        debug!("Cursor after move {} -> {}: {:?}", from, to, self.index);
    }
}
