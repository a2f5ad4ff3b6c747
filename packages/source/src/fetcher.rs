//! Dataset fetcher: path resolution, download, extraction, and memoization.

use std::sync::Arc;

use mobility_map_dataset_models::{DatasetKey, RegionParams};
use mobility_map_table::DataFrame;

use crate::FetchError;
use crate::archive::read_first_csv;
use crate::cache::Cache;
use crate::config::SourceConfig;
use crate::path::resolve_path;
use crate::progress::{ProgressCallback, null_progress};
use crate::transport::{HttpTransport, NetworkError, Transport};

/// Identity of one fetch in the cache.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchKey {
    /// Dataset that was requested.
    pub key: DatasetKey,
    /// Requested year.
    pub year: u16,
    /// Resolved archive path.
    pub path: String,
}

/// Downloads dataset archives and memoizes the parsed tables.
pub struct DatasetFetcher<T: Transport = HttpTransport> {
    config: SourceConfig,
    transport: T,
    cache: Cache<FetchKey, DataFrame>,
    progress: Arc<dyn ProgressCallback>,
}

impl<T: Transport> std::fmt::Debug for DatasetFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetFetcher")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl DatasetFetcher<HttpTransport> {
    /// Creates a fetcher that talks HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError`] if the HTTP client cannot be built.
    pub fn from_config(config: SourceConfig) -> Result<Self, NetworkError> {
        Ok(Self::new(config, HttpTransport::new()?))
    }
}

impl<T: Transport> DatasetFetcher<T> {
    /// Creates a fetcher with an unbounded cache and no progress reporting.
    #[must_use]
    pub fn new(config: SourceConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            cache: Cache::new(),
            progress: null_progress(),
        }
    }

    /// Reports download and extraction through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }

    /// Replaces the cache, e.g. with a capacity-bounded one.
    #[must_use]
    pub fn with_cache(mut self, cache: Cache<FetchKey, DataFrame>) -> Self {
        self.cache = cache;
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// The fetch cache.
    #[must_use]
    pub const fn cache(&self) -> &Cache<FetchKey, DataFrame> {
        &self.cache
    }

    /// Fetches the table for `key` in `year`.
    ///
    /// Identical `(key, year, path)` requests are served from the cache
    /// after the first success.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the path cannot be resolved, the download
    /// fails, or the archive holds no readable CSV.
    pub async fn fetch(
        &self,
        key: DatasetKey,
        year: u16,
        region: Option<RegionParams>,
    ) -> Result<Arc<DataFrame>, FetchError> {
        let path = resolve_path(key, year, region)?;
        let cache_key = FetchKey {
            key,
            year,
            path: path.clone(),
        };

        self.cache
            .get_or_compute(cache_key, || self.download(&path))
            .await
    }

    async fn download(&self, path: &str) -> Result<DataFrame, FetchError> {
        log::info!("Fetching {path}");
        self.progress.set_message("unzip...".to_string());

        let result = self.download_inner(path).await;
        self.progress.finish_and_clear();

        match &result {
            Ok(df) => log::info!(
                "Loaded {path}: {} rows, {} columns",
                df.height(),
                df.width()
            ),
            Err(e) => log::warn!("Fetch failed: {e}"),
        }
        result
    }

    async fn download_inner(&self, path: &str) -> Result<DataFrame, FetchError> {
        let url = self.config.url_for(path);
        let bytes = self
            .transport
            .get(&url, self.config.timeout)
            .await
            .map_err(|source| FetchError::Network {
                path: path.to_string(),
                source,
            })?;
        log::debug!("Downloaded {} bytes for {path}", bytes.len());

        read_first_csv(&bytes, path)
    }
}
