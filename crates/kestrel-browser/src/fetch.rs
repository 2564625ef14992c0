//! The fetch boundary.
//!
//! Everything outside the synchronous pipeline lives here: retrieving a
//! document or stylesheet by URL, capping how many requests are outstanding,
//! and abandoning waits when the caller gives up.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore, watch};

use crate::config::EngineConfig;
use crate::error::FetchError;

/// Retrieves the text behind a URL.
///
/// The core assumes the body decodes as UTF-8; charset negotiation is the
/// implementor's concern.
pub trait Fetch: Send + Sync {
    /// Fetch `url` and return its body as text.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// [`Fetch`] over HTTP(S) with `reqwest`, and over `file://` with `tokio::fs`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the configured timeout and user agent.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be created.
    pub fn new(config: &EngineConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(tokio::fs::read_to_string(path).await?);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }

        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,text/css,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))
    }
}

/// A cancellation signal shared between a caller and the work it started.
///
/// Clones observe the same signal. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct Cancellation {
    state: Arc<watch::Sender<bool>>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    /// A fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Fire the signal. Every pending [`cancelled`](Self::cancelled) wait wakes.
    pub fn cancel(&self) {
        let _ = self.state.send_replace(true);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the signal fires; immediately if it already has.
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

/// Proof of a held fetch slot. The slot is released on drop.
#[derive(Debug)]
pub struct FetchPermit {
    _permit: OwnedSemaphorePermit,
}

/// Bounded counting semaphore over outbound fetches.
#[derive(Debug, Clone)]
pub struct FetchLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl FetchLimiter {
    /// A limiter allowing `capacity` simultaneous fetches (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Maximum number of simultaneous fetches.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots currently held.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.capacity - self.semaphore.available_permits()
    }

    /// Wait for a free slot.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] if `cancel` fires before a slot
    /// frees up, including when it had already fired.
    pub async fn acquire(&self, cancel: &Cancellation) -> Result<FetchPermit, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            permit = Arc::clone(&self.semaphore).acquire_owned() => permit
                .map(|permit| FetchPermit { _permit: permit })
                .map_err(|_| FetchError::Cancelled),
        }
    }

    /// Fetch `url` while holding a slot.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cancelled`] if `cancel` fires while waiting for
    /// a slot or while the fetch is running, or the fetcher's own error.
    pub async fn fetch<F: Fetch>(
        &self,
        fetcher: &F,
        url: &str,
        cancel: &Cancellation,
    ) -> Result<String, FetchError> {
        let _permit = self.acquire(cancel).await?;
        log::debug!("fetching {url} ({} in flight)", self.in_flight());
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FetchError::Cancelled),
            result = fetcher.fetch(url) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared_between_clones() {
        let cancel = Cancellation::new();
        let clone = cancel.clone();
        assert!(!clone.is_cancelled());
        cancel.cancel();
        assert!(clone.is_cancelled());
        cancel.cancel();
        assert!(cancel.is_cancelled());
    }

    #[test]
    fn test_limiter_capacity_is_at_least_one() {
        let limiter = FetchLimiter::new(0);
        assert_eq!(limiter.capacity(), 1);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let limiter = FetchLimiter::new(2);
        let cancel = Cancellation::new();
        let permit = limiter.acquire(&cancel).await.unwrap();
        assert_eq!(limiter.in_flight(), 1);
        drop(permit);
        assert_eq!(limiter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_file_urls_are_read_from_disk() {
        let path = std::env::temp_dir().join("kestrel-fetch-test.css");
        std::fs::write(&path, "p { color: red }").unwrap();
        let fetcher = HttpFetcher::new(&EngineConfig::default()).unwrap();
        let url = format!("file://{}", path.display());
        assert_eq!(fetcher.fetch(&url).await.unwrap(), "p { color: red }");

        let missing = fetcher.fetch("file:///nonexistent/kestrel.css").await;
        assert!(matches!(missing, Err(FetchError::Io(_))));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_rejected() {
        let fetcher = HttpFetcher::new(&EngineConfig::default()).unwrap();
        assert!(matches!(
            fetcher.fetch("ftp://example.com/a.css").await,
            Err(FetchError::InvalidUrl(_))
        ));
    }
}
