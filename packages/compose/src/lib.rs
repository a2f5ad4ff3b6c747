#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map composition.
//!
//! Fits a color scale to each of two geometry tables, attaches tooltips and
//! legends, and lays the two layers out as linked panes, independent panes,
//! or a swipe comparison. The resulting [`MapArtifact`] serializes to JSON
//! and renders to a self-contained HTML page.

pub mod color;
pub mod composer;
mod html;
pub mod layer;

use mobility_map_geography::{MapCenter, map_center};
use mobility_map_table::DataFrame;
use thiserror::Error;

pub use color::{ColorScale, Palette, Rgb};
pub use composer::{BaseLayer, CompareMode, MapArtifact, MapComposer, MapView};
pub use layer::{Layer, LayerSpec, ValueFormat};

/// Errors that prevent a map from being shown.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// The table has no usable `lat`/`lon` to center on.
    #[error("地図表示できません。")]
    NoCenter,

    /// The artifact could not be serialized.
    #[error("Failed to serialize map: {0}")]
    Json(#[from] serde_json::Error),

    /// The HTML page could not be rendered.
    #[error("Failed to render map page: {0}")]
    Template(#[from] minijinja::Error),
}

/// Center of `df`, or [`DisplayError::NoCenter`].
///
/// # Errors
///
/// Returns [`DisplayError::NoCenter`] if the table lacks `lat`/`lon` or no
/// row has both.
pub fn require_center(df: &DataFrame) -> Result<MapCenter, DisplayError> {
    map_center(df).ok_or(DisplayError::NoCenter)
}

#[cfg(test)]
mod tests {
    use mobility_map_table::read_csv;

    use super::*;

    #[test]
    fn missing_center_cannot_be_displayed() {
        let table = read_csv("mesh1kmid,population\n1,10\n".as_bytes()).unwrap();

        let err = require_center(&table).unwrap_err();

        assert_eq!(err.to_string(), "地図表示できません。");
    }
}
