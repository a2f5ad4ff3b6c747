//! Blob storage configuration.
//!
//! # Environment Variables
//!
//! | Variable | Required | Description |
//! |---|---|---|
//! | `MOBILITY_MAP_BLOB_URL` | Yes | Base URL of the blob container holding the archives |
//! | `MOBILITY_MAP_BLOB_TOKEN` | Yes | Access token (SAS query string) appended to every URL |
//! | `MOBILITY_MAP_FETCH_TIMEOUT_SECS` | No | Per-request timeout in seconds (default 10) |
//!
//! The same settings can come from a TOML file:
//!
//! ```toml
//! [blob]
//! url = "https://example.blob.core.windows.net/mobility"
//! token = "sv=...&sig=..."
//! timeout_secs = 10
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Environment variable holding the blob base URL.
pub const ENV_BLOB_URL: &str = "MOBILITY_MAP_BLOB_URL";

/// Environment variable holding the blob access token.
pub const ENV_BLOB_TOKEN: &str = "MOBILITY_MAP_BLOB_TOKEN";

/// Environment variable overriding the request timeout.
pub const ENV_FETCH_TIMEOUT: &str = "MOBILITY_MAP_FETCH_TIMEOUT_SECS";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing environment variable: {name}")]
    MissingEnv {
        /// Name of the missing environment variable.
        name: String,
    },

    /// An environment variable is set but unusable.
    #[error("Invalid value for {name}: {value}")]
    InvalidEnv {
        /// Name of the environment variable.
        name: String,
        /// The rejected value.
        value: String,
    },

    /// The config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or is missing keys.
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Where archives live and how to authenticate against it.
#[derive(Clone)]
pub struct SourceConfig {
    /// Base URL of the blob container.
    pub base_url: String,
    /// Access token appended as the URL query string.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Deserialize)]
struct ConfigFile {
    blob: BlobSection,
}

#[derive(Deserialize)]
struct BlobSection {
    url: String,
    token: String,
    timeout_secs: Option<u64>,
}

impl SourceConfig {
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a config with the default timeout.
    #[must_use]
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            token: token.to_owned(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Loads the config from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or the
    /// timeout is not a whole number of seconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the config through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or the
    /// timeout is not a whole number of seconds.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnv {
                    name: name.to_string(),
                })
        };

        let mut config = Self::new(&require(ENV_BLOB_URL)?, &require(ENV_BLOB_TOKEN)?);

        if let Some(raw) = lookup(ENV_FETCH_TIMEOUT) {
            let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                name: ENV_FETCH_TIMEOUT.to_string(),
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Parses the config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid or the
    /// `[blob]` table lacks `url` or `token`.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        let mut config = Self::new(&file.blob.url, &file.blob.token);
        if let Some(secs) = file.blob.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&text)
    }

    /// Full retrieval URL for an archive path.
    ///
    /// Joins the base URL and path with exactly one `/` and appends the
    /// token as the query string.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let token = self.token.trim_start_matches('?');
        format!("{base}/{path}?{token}")
    }
}
