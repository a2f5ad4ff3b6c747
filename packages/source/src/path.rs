//! Archive path templates.

use mobility_map_dataset_models::{DatasetKey, RegionParams};

use crate::FetchError;

/// Mesh attribute archive for 2019; every other year uses the 2020 file.
const MESH_ATTRIBUTE_2019: &str = "attribute/attribute_mesh1km_2019.csv.zip";
const MESH_ATTRIBUTE_2020: &str = "attribute/attribute_mesh1km_2020.csv.zip";

/// Resolves the archive path for a dataset, year, and region.
///
/// The mesh attribute table is keyed by year alone and ignores `region`.
/// Per-prefecture datasets follow
/// `{key}/{pref:02}/{year}/{month:02}/monthly_{key}_{unit}.csv.zip`.
///
/// # Errors
///
/// Returns [`FetchError::MissingRegion`] if a per-prefecture dataset is
/// requested without region parameters.
pub fn resolve_path(
    key: DatasetKey,
    year: u16,
    region: Option<RegionParams>,
) -> Result<String, FetchError> {
    let unit = match key {
        DatasetKey::Mesh1km => {
            return Ok(if year == 2019 {
                MESH_ATTRIBUTE_2019
            } else {
                MESH_ATTRIBUTE_2020
            }
            .to_string());
        }
        DatasetKey::Mdp => "mesh1km",
        DatasetKey::Fromto => "city",
    };

    let RegionParams { prefecture, month } = region.ok_or(FetchError::MissingRegion { key })?;

    Ok(format!(
        "{key}/{prefecture:02}/{year}/{month:02}/monthly_{key}_{unit}.csv.zip"
    ))
}
