//! City names by municipality code.
//!
//! The region master is a CSV with at least `prefcode, prefname, citycode,
//! cityname` columns and an optional `regionname`. Extra columns are
//! ignored.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use mobility_map_geography_models::CityRecord;

use crate::GeometryError;

/// City records keyed by city code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionMaster {
    cities: BTreeMap<u32, CityRecord>,
}

impl RegionMaster {
    /// Parses a region master CSV.
    ///
    /// A later row with the same city code replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Csv`] if a row cannot be decoded.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, GeometryError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut cities = BTreeMap::new();
        for record in csv_reader.deserialize::<CityRecord>() {
            let record = record?;
            cities.insert(record.citycode, record);
        }

        log::debug!("Loaded region master with {} cities", cities.len());
        Ok(Self { cities })
    }

    /// Reads a region master CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError`] if the file cannot be opened or decoded.
    pub fn from_path(path: &Path) -> Result<Self, GeometryError> {
        let file = std::fs::File::open(path).map_err(|e| GeometryError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_csv_reader(file)
    }

    /// Name of the city with `code`.
    #[must_use]
    pub fn city_name(&self, code: u32) -> Option<&str> {
        self.cities.get(&code).map(|c| c.cityname.as_str())
    }

    /// Full record of the city with `code`.
    #[must_use]
    pub fn city(&self, code: u32) -> Option<&CityRecord> {
        self.cities.get(&code)
    }

    /// Cities of a prefecture in city-code order.
    pub fn cities_in(&self, prefcode: u8) -> impl Iterator<Item = &CityRecord> {
        self.cities.values().filter(move |c| c.prefcode == prefcode)
    }

    /// Number of cities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cities.len()
    }

    /// Whether the master is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "prefcode,prefname,citycode,cityname,regionname\n\
                          13,東京都,13101,千代田区,関東\n\
                          13,東京都,13102,中央区,関東\n\
                          27,大阪府,27100,大阪市,近畿\n";

    #[test]
    fn looks_up_city_names() {
        let master = RegionMaster::from_csv_reader(MASTER.as_bytes()).unwrap();

        assert_eq!(master.len(), 3);
        assert_eq!(master.city_name(13101), Some("千代田区"));
        assert_eq!(master.city_name(99999), None);
        assert_eq!(
            master.city(27100).and_then(|c| c.regionname.as_deref()),
            Some("近畿")
        );
    }

    #[test]
    fn lists_cities_of_a_prefecture() {
        let master = RegionMaster::from_csv_reader(MASTER.as_bytes()).unwrap();

        let tokyo: Vec<u32> = master.cities_in(13).map(|c| c.citycode).collect();
        assert_eq!(tokyo, [13101, 13102]);
        assert_eq!(master.cities_in(1).count(), 0);
    }

    #[test]
    fn region_column_is_optional() {
        let master = RegionMaster::from_csv_reader(
            "prefcode,prefname,citycode,cityname\n1,北海道,1100,札幌市\n".as_bytes(),
        )
        .unwrap();

        assert_eq!(master.city(1100).unwrap().regionname, None);
    }

    #[test]
    fn malformed_row_is_an_error() {
        let err = RegionMaster::from_csv_reader(
            "prefcode,prefname,citycode,cityname\nxx,北海道,1100,札幌市\n".as_bytes(),
        )
        .unwrap_err();

        assert!(matches!(err, GeometryError::Csv(_)));
    }
}
