//! Shared test fetcher.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use kestrel_browser::{Fetch, FetchError};
use parking_lot::Mutex;

/// Serves canned bodies, optionally after a delay, and records how many
/// requests were ever outstanding at once.
#[derive(Debug, Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    delays: HashMap<String, Duration>,
    active: AtomicUsize,
    peak: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        let _ = self.pages.insert(url.to_string(), body.to_string());
        self
    }

    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        let _ = self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

impl Fetch for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.requested.lock().push(url.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _ = self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(url)
            .copied()
            .unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;

        let _ = self.active.fetch_sub(1, Ordering::SeqCst);
        self.pages.get(url).cloned().ok_or(FetchError::Http(404))
    }
}
