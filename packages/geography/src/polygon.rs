//! Rectangle polygons from mesh corner columns.

use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use mobility_map_table::{DataFrame, Series, TableError, float_values, require_column};
use polars::prelude::{DataType, PolarsError};
use serde_json::{Number, Value};

use crate::GeometryError;

/// Corner columns every mesh row must carry.
pub const LON_MIN: &str = "lon_min";
/// See [`LON_MIN`].
pub const LAT_MIN: &str = "lat_min";
/// See [`LON_MIN`].
pub const LON_MAX: &str = "lon_max";
/// See [`LON_MIN`].
pub const LAT_MAX: &str = "lat_max";

/// One value and the rectangle it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    /// Cell copied verbatim from the value column, as JSON.
    pub value: Value,
    /// Closed five-point ring, no holes.
    pub geometry: Polygon<f64>,
}

/// A value column paired with one polygon per row.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryTable {
    value_column: String,
    records: Vec<GeometryRecord>,
}

/// Builds one rectangle per row of `df` and keeps only `value_column`.
///
/// The ring runs `(max, min) -> (max, max) -> (min, max) -> (min, min) ->
/// (max, min)` in `(lon, lat)` order. Corners are taken as given, so an
/// inverted box stays inverted and a degenerate one has zero area. A null
/// corner becomes `NaN`.
///
/// # Errors
///
/// Returns [`GeometryError::Table`] if `value_column` or a corner column
/// is missing.
pub fn build(df: &DataFrame, value_column: &str) -> Result<GeometryTable, GeometryError> {
    let values = json_cells(require_column(df, value_column)?).map_err(TableError::from)?;
    let lon_min = float_values(df, LON_MIN)?;
    let lat_min = float_values(df, LAT_MIN)?;
    let lon_max = float_values(df, LON_MAX)?;
    let lat_max = float_values(df, LAT_MAX)?;

    let coord = |v: Option<f64>| v.unwrap_or(f64::NAN);

    let records: Vec<GeometryRecord> = values
        .into_iter()
        .enumerate()
        .map(|(i, value)| GeometryRecord {
            value,
            geometry: rectangle(
                coord(lon_min[i]),
                coord(lat_min[i]),
                coord(lon_max[i]),
                coord(lat_max[i]),
            ),
        })
        .collect();

    let nan_rows = records
        .iter()
        .filter(|r| r.geometry.exterior().coords().any(|c| c.x.is_nan() || c.y.is_nan()))
        .count();
    if nan_rows > 0 {
        log::warn!("{nan_rows} of {} polygons have missing corners", records.len());
    }
    log::debug!("Built {} polygons of {value_column}", records.len());

    Ok(GeometryTable {
        value_column: value_column.to_string(),
        records,
    })
}

/// Integers stay integers, other numbers become JSON floats with `NaN`
/// as `null`, and everything else is rendered as text.
fn json_cells(series: &Series) -> Result<Vec<Value>, PolarsError> {
    let dtype = series.dtype();
    if dtype.is_integer() {
        let ints = series.cast(&DataType::Int64)?;
        return Ok(ints
            .i64()?
            .into_iter()
            .map(|v| v.map_or(Value::Null, Value::from))
            .collect());
    }
    if dtype.is_numeric() {
        let floats = series.cast(&DataType::Float64)?;
        return Ok(floats
            .f64()?
            .into_iter()
            .map(|v| v.and_then(Number::from_f64).map_or(Value::Null, Value::Number))
            .collect());
    }

    let text = series.cast(&DataType::String)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|v| v.map_or(Value::Null, |s| Value::String(s.to_string())))
        .collect())
}

fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Polygon<f64> {
    Polygon::new(
        LineString::from(vec![
            (max_x, min_y),
            (max_x, max_y),
            (min_x, max_y),
            (min_x, min_y),
            (max_x, min_y),
        ]),
        vec![],
    )
}

impl GeometryTable {
    /// Name of the value column.
    #[must_use]
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// The records in input row order.
    #[must_use]
    pub fn records(&self) -> &[GeometryRecord] {
        &self.records
    }

    /// Number of records.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest numeric value, ignoring nulls.
    #[must_use]
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| r.value.as_f64())
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }

    /// Converts to a `GeoJSON` feature collection.
    ///
    /// Each feature carries its value under the value column name. `NaN`
    /// values and coordinates serialize as `null`.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let features = self
            .records
            .iter()
            .map(|record| {
                let mut properties = JsonObject::new();
                properties.insert(self.value_column.clone(), record.value.clone());
                Feature {
                    bbox: None,
                    geometry: Some(Geometry::new(geojson::Value::from(&record.geometry))),
                    id: None,
                    properties: Some(properties),
                    foreign_members: None,
                }
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use geo::{Area, BoundingRect, Coord};
    use mobility_map_table::read_csv;
    use serde_json::json;

    use super::*;

    fn mesh(csv: &str) -> DataFrame {
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn bounding_box_matches_corners() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,v\n139.0,35.0,139.5,35.5,1\n");

        let geometry = build(&table, "v").unwrap();
        let rect = geometry.records()[0].geometry.bounding_rect().unwrap();

        assert_eq!(rect.min(), Coord { x: 139.0, y: 35.0 });
        assert_eq!(rect.max(), Coord { x: 139.5, y: 35.5 });
    }

    #[test]
    fn ring_starts_at_max_min_corner() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,v\n0,0,2,1,1\n");

        let geometry = build(&table, "v").unwrap();
        let ring: Vec<(f64, f64)> = geometry.records()[0]
            .geometry
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect();

        assert_eq!(
            ring,
            [(2.0, 0.0), (2.0, 1.0), (0.0, 1.0), (0.0, 0.0), (2.0, 0.0)]
        );
    }

    #[test]
    fn degenerate_rectangle_has_zero_area() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,v\n139.0,35.0,139.0,35.0,1\n");

        let geometry = build(&table, "v").unwrap();

        assert!(geometry.records()[0].geometry.unsigned_area().abs() < f64::EPSILON);
    }

    #[test]
    fn keeps_row_order_and_values() {
        let table = mesh(
            "mesh1kmid,lon_min,lat_min,lon_max,lat_max,population\n\
             1,0,0,1,1,10\n\
             2,1,0,2,1,20\n\
             3,2,0,3,1,30\n",
        );

        let geometry = build(&table, "population").unwrap();

        assert_eq!(geometry.len(), 3);
        assert_eq!(geometry.value_column(), "population");
        let values: Vec<&Value> = geometry.records().iter().map(|r| &r.value).collect();
        assert_eq!(values, [&json!(10), &json!(20), &json!(30)]);
        assert_eq!(geometry.value_range(), Some((10.0, 30.0)));
    }

    #[test]
    fn null_corner_becomes_nan() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,v\n,0,1,1,5\n");

        let geometry = build(&table, "v").unwrap();

        assert!(
            geometry.records()[0]
                .geometry
                .exterior()
                .coords()
                .any(|c| c.x.is_nan())
        );
    }

    #[test]
    fn missing_columns_are_errors() {
        let table = mesh("lon_min,lat_min,lon_max,v\n0,0,1,1\n");
        assert!(build(&table, "v").is_err());

        let table = mesh("lon_min,lat_min,lon_max,lat_max\n0,0,1,1\n");
        assert!(build(&table, "v").is_err());
    }

    #[test]
    fn feature_collection_carries_values() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,diff\n0,0,1,1,0.25\n0,0,1,1,\n");

        let collection = build(&table, "diff").unwrap().to_feature_collection();

        assert_eq!(collection.features.len(), 2);
        let first = collection.features[0].properties.as_ref().unwrap();
        assert_eq!(first["diff"], json!(0.25));
        let second = collection.features[1].properties.as_ref().unwrap();
        assert!(second["diff"].is_null());
        assert!(collection.features[0].geometry.is_some());
    }

    #[test]
    fn text_values_pass_through() {
        let table = mesh("lon_min,lat_min,lon_max,lat_max,name\n0,0,1,1,Chiyoda\n");

        let geometry = build(&table, "name").unwrap();

        assert_eq!(geometry.records()[0].value, json!("Chiyoda"));
        assert_eq!(geometry.value_range(), None);
    }
}
