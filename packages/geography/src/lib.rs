#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Mesh geometry and region lookups.
//!
//! Turns rows carrying `lon_min`/`lat_min`/`lon_max`/`lat_max` corner
//! columns into rectangle polygons, exports them as `GeoJSON`, computes the
//! initial map center of a table, and loads the region master that maps
//! city codes to names.

pub mod center;
pub mod polygon;
pub mod region_master;

use mobility_map_table::TableError;
use thiserror::Error;

pub use center::{MapCenter, map_center};
pub use polygon::{GeometryRecord, GeometryTable};
pub use region_master::RegionMaster;

/// Errors that can occur during geography operations.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// A required column is missing from the input table.
    #[error(transparent)]
    Table(#[from] TableError),

    /// The region master CSV is malformed.
    #[error("Region master CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The region master file could not be opened.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
