//! Tabs and their navigation history.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::document::Document;
use crate::error::BuildError;

/// Title shown for a tab with nothing loaded.
pub const DEFAULT_TITLE: &str = "New Tab";

/// Title shown while a navigation is in flight.
pub const LOADING_TITLE: &str = "Loading...";

/// Identifies a tab for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u64);

impl TabId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visited URLs with a cursor at the current one.
///
/// Visiting a new URL after going back drops the forward entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    /// An empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Record a visit to `url`, discarding anything ahead of the cursor.
    pub fn push(&mut self, url: &str) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(url.to_string());
        self.cursor = self.entries.len() - 1;
    }

    /// The URL under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Whether there is an entry behind the cursor.
    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    /// Whether there is an entry ahead of the cursor.
    #[must_use]
    pub const fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Step back and return the new current URL.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward and return the new current URL.
    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been visited.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One tab: its URL, history, loading state and current document.
#[derive(Debug)]
pub struct Tab {
    id: TabId,
    title: String,
    url: String,
    content: Option<Document>,
    loading: bool,
    error: Option<String>,
    history: History,
}

impl Default for Tab {
    fn default() -> Self {
        Self::new()
    }
}

impl Tab {
    /// A blank tab with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: TabId::next(),
            title: String::new(),
            url: String::new(),
            content: None,
            loading: false,
            error: None,
            history: History::new(),
        }
    }

    /// This tab's id.
    #[must_use]
    pub const fn id(&self) -> TabId {
        self.id
    }

    /// The title to display.
    ///
    /// `"Loading..."` while a navigation is in flight, `"New Tab"` when the
    /// loaded document has no title, otherwise the document's title.
    #[must_use]
    pub fn title(&self) -> &str {
        if self.loading {
            LOADING_TITLE
        } else if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    /// The current URL; empty for a blank tab.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The last successfully loaded document.
    #[must_use]
    pub const fn content(&self) -> Option<&Document> {
        self.content.as_ref()
    }

    /// Whether a navigation is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Why the last navigation failed, if it did.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The navigation history.
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    /// Start navigating to `url`, recording it in the history.
    pub fn navigate(&mut self, url: &str) {
        self.history.push(url);
        self.begin_loading(url);
    }

    /// Start reloading the current URL without touching the history.
    pub fn reload(&mut self) {
        let url = self.url.clone();
        self.begin_loading(&url);
    }

    fn begin_loading(&mut self, url: &str) {
        url.clone_into(&mut self.url);
        self.loading = true;
        self.error = None;
    }

    /// Whether [`go_back`](Self::go_back) would move.
    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    /// Whether [`go_forward`](Self::go_forward) would move.
    #[must_use]
    pub const fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// Move back in history. Returns whether the URL changed; the caller
    /// reloads.
    pub fn go_back(&mut self) -> bool {
        let Some(url) = self.history.back() else {
            return false;
        };
        url.clone_into(&mut self.url);
        true
    }

    /// Move forward in history. Returns whether the URL changed; the caller
    /// reloads.
    pub fn go_forward(&mut self) -> bool {
        let Some(url) = self.history.forward() else {
            return false;
        };
        url.clone_into(&mut self.url);
        true
    }

    /// Finish a navigation with its document.
    pub fn finish_loading(&mut self, document: Document) {
        self.title = document.title().unwrap_or_default().to_string();
        self.content = Some(document);
        self.loading = false;
        self.error = None;
    }

    /// Finish a navigation that failed. The previous document stays.
    pub fn fail_loading(&mut self, err: &BuildError) {
        self.loading = false;
        self.error = Some(err.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_ids_are_unique() {
        let a = Tab::new();
        let b = Tab::new();
        assert_ne!(a.id(), b.id());
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_history_push_truncates_forward() {
        let mut history = History::new();
        assert_eq!(history.current(), None);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(history.back(), Some("b"));
        assert_eq!(history.back(), Some("a"));
        assert_eq!(history.back(), None);
        history.push("d");
        assert_eq!(history.len(), 2);
        assert!(!history.can_go_forward());
        assert_eq!(history.current(), Some("d"));
    }

    #[test]
    fn test_blank_tab() {
        let tab = Tab::new();
        assert_eq!(tab.title(), DEFAULT_TITLE);
        assert_eq!(tab.url(), "");
        assert!(tab.content().is_none());
        assert!(!tab.can_go_back());
    }
}
