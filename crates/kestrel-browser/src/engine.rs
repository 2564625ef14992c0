//! The tab list.
//!
//! The list itself sits behind one read/write lock, taken only to add,
//! remove or look up a tab and never held across a fetch. Each tab has its
//! own mutex, so a navigation in one tab never blocks another.

use std::sync::Arc;

use kestrel_common::url::normalize_url;
use parking_lot::{Mutex, RwLock};

use crate::config::EngineConfig;
use crate::document::DocumentBuilder;
use crate::error::{BuildError, FetchError};
use crate::fetch::{Cancellation, Fetch, HttpFetcher};
use crate::tab::{Tab, TabId};

/// Owns the tabs and the build pipeline they load through.
#[derive(Debug)]
pub struct Engine<F> {
    tabs: RwLock<Vec<Arc<Mutex<Tab>>>>,
    builder: DocumentBuilder<F>,
}

impl Engine<HttpFetcher> {
    /// An engine fetching over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be created.
    pub fn with_http(config: EngineConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(fetcher, config))
    }
}

impl<F: Fetch> Engine<F> {
    /// An engine with no tabs.
    #[must_use]
    pub fn new(fetcher: F, config: EngineConfig) -> Self {
        Self {
            tabs: RwLock::new(Vec::new()),
            builder: DocumentBuilder::new(fetcher, config),
        }
    }

    /// The build pipeline.
    #[must_use]
    pub const fn builder(&self) -> &DocumentBuilder<F> {
        &self.builder
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        self.builder.config()
    }

    /// Open a blank tab at the end of the list.
    #[must_use]
    pub fn add_tab(&self) -> TabId {
        let tab = Tab::new();
        let id = tab.id();
        self.tabs.write().push(Arc::new(Mutex::new(tab)));
        log::debug!("opened tab {id}");
        id
    }

    /// Close a tab. Returns whether it existed.
    ///
    /// A load still running in the closed tab finishes into a tab nobody
    /// can reach.
    pub fn close_tab(&self, id: TabId) -> bool {
        let mut tabs = self.tabs.write();
        let before = tabs.len();
        tabs.retain(|tab| tab.lock().id() != id);
        before != tabs.len()
    }

    /// Number of open tabs.
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.read().len()
    }

    /// Ids of the open tabs in display order.
    #[must_use]
    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.read().iter().map(|tab| tab.lock().id()).collect()
    }

    /// Look up a tab.
    #[must_use]
    pub fn tab(&self, id: TabId) -> Option<Arc<Mutex<Tab>>> {
        self.tabs
            .read()
            .iter()
            .find(|tab| tab.lock().id() == id)
            .cloned()
    }

    /// Navigate tab `id` to a typed address.
    ///
    /// The address is normalized first, so `example.com` loads
    /// `https://example.com`. On failure the tab keeps its previous
    /// document and records the error.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTab`] for a closed tab, otherwise
    /// whatever the navigation failed with.
    pub async fn load(
        &self,
        id: TabId,
        address: &str,
        cancel: &Cancellation,
    ) -> Result<(), BuildError> {
        let tab = self.tab(id).ok_or(BuildError::UnknownTab(id))?;
        let url = match normalize_url(address) {
            Ok(url) => url,
            Err(err) => {
                let err = BuildError::FetchFailure {
                    url: address.to_string(),
                    reason: err.to_string(),
                };
                tab.lock().fail_loading(&err);
                return Err(err);
            }
        };
        tab.lock().navigate(&url);
        self.run(&tab, &url, cancel).await
    }

    /// Reload the current URL of tab `id`. A blank tab stays blank.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownTab`] for a closed tab, otherwise
    /// whatever the navigation failed with.
    pub async fn refresh(&self, id: TabId, cancel: &Cancellation) -> Result<(), BuildError> {
        let tab = self.tab(id).ok_or(BuildError::UnknownTab(id))?;
        let url = {
            let mut tab = tab.lock();
            if tab.url().is_empty() {
                return Ok(());
            }
            tab.reload();
            tab.url().to_string()
        };
        self.run(&tab, &url, cancel).await
    }

    /// Step tab `id` back in its history and load that page.
    ///
    /// # Errors
    ///
    /// As for [`refresh`](Self::refresh).
    pub async fn go_back(&self, id: TabId, cancel: &Cancellation) -> Result<(), BuildError> {
        let tab = self.tab(id).ok_or(BuildError::UnknownTab(id))?;
        let moved = tab.lock().go_back();
        if moved {
            self.refresh(id, cancel).await
        } else {
            Ok(())
        }
    }

    /// Step tab `id` forward in its history and load that page.
    ///
    /// # Errors
    ///
    /// As for [`refresh`](Self::refresh).
    pub async fn go_forward(&self, id: TabId, cancel: &Cancellation) -> Result<(), BuildError> {
        let tab = self.tab(id).ok_or(BuildError::UnknownTab(id))?;
        let moved = tab.lock().go_forward();
        if moved {
            self.refresh(id, cancel).await
        } else {
            Ok(())
        }
    }

    async fn run(
        &self,
        tab: &Mutex<Tab>,
        url: &str,
        cancel: &Cancellation,
    ) -> Result<(), BuildError> {
        let result = self.builder.navigate(url, cancel).await;
        let mut tab = tab.lock();
        match result {
            Ok(document) => {
                tab.finish_loading(document);
                Ok(())
            }
            Err(err) => {
                log::warn!("tab {} failed to load {url}: {err}", tab.id());
                tab.fail_loading(&err);
                Err(err)
            }
        }
    }
}
