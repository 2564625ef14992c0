//! Engine configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default `User-Agent` header for outbound requests.
pub const DEFAULT_USER_AGENT: &str = concat!("Kestrel/", env!("CARGO_PKG_VERSION"));

/// Tunables for building, fetching and laying out documents.
///
/// Every field has a default, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "viewport_width": 800, "max_concurrent_fetches": 2, "fetch_timeout": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Width in pixels used for media queries and layout.
    pub viewport_width: f32,
    /// Height in pixels used for culling.
    pub viewport_height: f32,
    /// Upper bound on simultaneous outbound fetches.
    pub max_concurrent_fetches: usize,
    /// Per-request timeout, written in seconds.
    #[serde(with = "duration_secs")]
    pub fetch_timeout: Duration,
    /// Whether `<link rel=stylesheet>` targets are fetched.
    pub fetch_external_stylesheets: bool,
    /// `User-Agent` header for HTTP requests.
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1200.0,
            viewport_height: 800.0,
            max_concurrent_fetches: 6,
            fetch_timeout: Duration::from_secs(30),
            fetch_external_stylesheets: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl EngineConfig {
    /// Read a config from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Parse a config from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
