#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prefecture and city reference types.
//!
//! Prefecture codes are the two-digit JIS X 0401 codes used throughout the
//! mobility datasets. City codes are the five-digit municipality codes
//! without check digit.

pub mod prefecture;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One of the eight conventional macro-regions of Japan.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum MacroRegion {
    /// Hokkaido.
    #[serde(rename = "北海道")]
    #[strum(serialize = "北海道")]
    Hokkaido,
    /// Tohoku.
    #[serde(rename = "東北")]
    #[strum(serialize = "東北")]
    Tohoku,
    /// Kanto.
    #[serde(rename = "関東")]
    #[strum(serialize = "関東")]
    Kanto,
    /// Chubu.
    #[serde(rename = "中部")]
    #[strum(serialize = "中部")]
    Chubu,
    /// Kinki.
    #[serde(rename = "近畿")]
    #[strum(serialize = "近畿")]
    Kinki,
    /// Chugoku.
    #[serde(rename = "中国")]
    #[strum(serialize = "中国")]
    Chugoku,
    /// Shikoku.
    #[serde(rename = "四国")]
    #[strum(serialize = "四国")]
    Shikoku,
    /// Kyushu, including Okinawa.
    #[serde(rename = "九州")]
    #[strum(serialize = "九州")]
    Kyushu,
}

impl MacroRegion {
    /// All macro-regions from north to south.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Hokkaido,
            Self::Tohoku,
            Self::Kanto,
            Self::Chubu,
            Self::Kinki,
            Self::Chugoku,
            Self::Shikoku,
            Self::Kyushu,
        ]
    }
}

/// A prefecture with its display name and macro-region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prefecture {
    /// Two-digit prefecture code (1-47).
    pub code: u8,
    /// Japanese name including the 都/道/府/県 suffix.
    pub name: &'static str,
    /// Macro-region the prefecture belongs to.
    pub region: MacroRegion,
}

/// One row of the region master table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    /// Prefecture code.
    pub prefcode: u8,
    /// Prefecture name.
    pub prefname: String,
    /// Five-digit municipality code.
    pub citycode: u32,
    /// Municipality name.
    pub cityname: String,
    /// Macro-region name, when the master carries one.
    #[serde(default)]
    pub regionname: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_region_names_round_trip() {
        for region in MacroRegion::all() {
            let parsed: MacroRegion = region.to_string().parse().unwrap();
            assert_eq!(parsed, *region);
        }
        assert_eq!(MacroRegion::Kanto.as_ref(), "関東");
    }
}
