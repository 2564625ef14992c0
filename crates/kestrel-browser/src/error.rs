//! Errors surfaced by the build pipeline and the fetch boundary.
//!
//! Markup and stylesheet problems never show up here; the parsers recover
//! and report them through the warning channel. Only failures the caller
//! has to act on become an `Err`.

use thiserror::Error;

use crate::tab::TabId;

/// Why a document could not be built.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The markup was empty or only whitespace.
    #[error("empty document")]
    InvalidInput,

    /// The primary document could not be fetched.
    #[error("failed to load {url}: {reason}")]
    FetchFailure {
        /// The address that was requested.
        url: String,
        /// What went wrong.
        reason: String,
    },

    /// The navigation was cancelled before it finished.
    #[error("navigation cancelled")]
    Cancelled,

    /// No tab has this id.
    #[error("no tab with id {0}")]
    UnknownTab(TabId),
}

impl BuildError {
    /// Wrap a failed primary fetch of `url`.
    pub(crate) fn from_fetch(url: &str, err: FetchError) -> Self {
        match err {
            FetchError::Cancelled => Self::Cancelled,
            other => Self::FetchFailure {
                url: url.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

/// A single fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL has a scheme the fetcher cannot retrieve.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {0}")]
    Http(u16),

    /// The request could not be sent or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The caller's cancellation fired first.
    #[error("fetch cancelled")]
    Cancelled,

    /// Reading a `file://` URL failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An [`EngineConfig`](crate::EngineConfig) file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid config JSON.
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
