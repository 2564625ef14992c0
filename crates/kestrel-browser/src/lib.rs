//! High-level browser API for the Kestrel render core.
//!
//! # Scope
//!
//! This crate provides:
//! - **Document Building** - parse markup, gather author CSS, compute styles
//! - **Layout Entry Point** - lay a built document out into a display list
//! - **Fetch Boundary** - HTTP and file fetching behind a bounded limiter
//!   with cooperative cancellation
//! - **Tabs** - per-tab history and title state, and the engine's tab list
//!
//! # Not Yet Implemented
//!
//! - Images, fonts and other subresources
//! - External scripts (`<script src="...">`) are recorded, never fetched
//! - `@import` rules are recorded, never followed

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod tab;

pub use kestrel_css as css;
pub use kestrel_dom as dom;
pub use kestrel_html as html;

pub use config::EngineConfig;
pub use document::{Document, DocumentBuilder};
pub use engine::Engine;
pub use error::{BuildError, ConfigError, FetchError};
pub use fetch::{Cancellation, Fetch, FetchLimiter, FetchPermit, HttpFetcher};
pub use tab::{History, Tab, TabId};
