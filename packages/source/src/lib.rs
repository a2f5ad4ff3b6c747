#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Remote dataset fetching.
//!
//! Resolves a dataset key, year, and region into an archive path, downloads
//! the ZIP archive from blob storage, and parses its first CSV member into a
//! polars [`DataFrame`](mobility_map_table::DataFrame). Successful
//! downloads are memoized in a [`cache::Cache`] for the lifetime of the
//! fetcher; failures are never cached, so a retry always goes back to the
//! network.

pub mod archive;
pub mod cache;
pub mod config;
pub mod fetcher;
pub mod path;
pub mod progress;
pub mod transport;

use mobility_map_dataset_models::DatasetKey;
use mobility_map_table::TableError;

pub use config::{ConfigError, SourceConfig};
pub use fetcher::{DatasetFetcher, FetchKey};
pub use transport::{HttpTransport, NetworkError, Transport};

/// Errors that can occur while fetching a dataset.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The archive could not be retrieved.
    #[error("Network error fetching {path}: {source}")]
    Network {
        /// Archive path relative to the blob base URL.
        path: String,
        /// Underlying transport failure.
        source: NetworkError,
    },

    /// The downloaded payload is not a readable ZIP archive.
    #[error("Invalid archive format at {path}: {message}")]
    ArchiveFormat {
        /// Archive path relative to the blob base URL.
        path: String,
        /// Description of the archive failure.
        message: String,
    },

    /// The archive has no `.csv` member.
    #[error("No CSV file found in archive at {path}")]
    NoDataFound {
        /// Archive path relative to the blob base URL.
        path: String,
    },

    /// The CSV member could not be parsed.
    #[error("Failed to parse {member} in {path}: {source}")]
    Parse {
        /// Archive path relative to the blob base URL.
        path: String,
        /// Name of the CSV member inside the archive.
        member: String,
        /// Underlying table error.
        source: TableError,
    },

    /// A per-prefecture dataset was requested without a prefecture.
    #[error("Dataset {key} requires a prefecture and month")]
    MissingRegion {
        /// The dataset that was requested.
        key: DatasetKey,
    },
}
