//! Initial map center of a table.

use mobility_map_table::{DataFrame, float_values};
use serde::Serialize;

/// Latitude and longitude of a map's initial view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

/// Mean `lat` and mean `lon` over rows where both are present.
///
/// Returns `None` if either column is absent or no row has both values.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn map_center(df: &DataFrame) -> Option<MapCenter> {
    let lats = float_values(df, "lat").ok()?;
    let lons = float_values(df, "lon").ok()?;

    let (count, lat_sum, lon_sum) = lats
        .into_iter()
        .zip(lons)
        .filter_map(|(lat, lon)| {
            let lat = lat.filter(|x| !x.is_nan())?;
            let lon = lon.filter(|x| !x.is_nan())?;
            Some((lat, lon))
        })
        .fold((0usize, 0.0, 0.0), |(n, lat_sum, lon_sum), (lat, lon)| {
            (n + 1, lat_sum + lat, lon_sum + lon)
        });

    if count == 0 {
        return None;
    }

    Some(MapCenter {
        lat: lat_sum / count as f64,
        lon: lon_sum / count as f64,
    })
}

#[cfg(test)]
mod tests {
    use mobility_map_table::read_csv;

    use super::*;

    fn table(csv: &str) -> DataFrame {
        read_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn averages_rows_with_both_coordinates() {
        let center = map_center(&table("lat,lon\n35.0,139.0\n36.0,141.0\n,140.0\n37.0,\n")).unwrap();

        assert!((center.lat - 35.5).abs() < 1e-9);
        assert!((center.lon - 140.0).abs() < 1e-9);
    }

    #[test]
    fn no_center_without_columns_or_values() {
        assert_eq!(map_center(&table("lat,value\n35.0,1\n")), None);
        assert_eq!(map_center(&table("lat,lon\n,139.0\n")), None);
    }
}
