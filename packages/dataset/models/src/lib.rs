#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset keys, aggregation flags, and region selection types.
//!
//! The mobility open data is published as monthly ZIP archives per
//! prefecture. Every row carries a day-type flag and a time-of-day flag, and
//! the city-level flow dataset additionally carries the locality tier of the
//! visitors' origin. This crate defines those wire codes and their display
//! labels so every other crate agrees on them.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Logical dataset identifier.
///
/// Selects both the archive path template and the shape of the resulting
/// table (mesh grid vs. city table).
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DatasetKey {
    /// Mesh attribute reference table (corners and centers of every 1km mesh).
    Mesh1km,
    /// Monthly population per 1km mesh.
    Mdp,
    /// Monthly visitors per city, split by origin locality tier.
    Fromto,
}

impl DatasetKey {
    /// Human-readable name of a user-selectable dataset.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mesh1km => "1kmメッシュ属性",
            Self::Mdp => "1kmメッシュ",
            Self::Fromto => "市区町村単位発地別",
        }
    }

    /// Short description shown next to a dataset choice.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Mesh1km => "1km メッシュの四隅と中心の緯度経度",
            Self::Mdp => "1km メッシュ別に、いつ、何人が滞在したのかを収録したデータ",
            Self::Fromto => {
                "市区町村別に、いつ、どこ（同市区町村／同都道府県／同地方／それ以外）から何人来たのかを収録したデータ"
            }
        }
    }

    /// Whether rows of this dataset are keyed by mesh id (and therefore
    /// renderable as a map) rather than by city.
    #[must_use]
    pub const fn is_mesh(self) -> bool {
        matches!(self, Self::Mesh1km | Self::Mdp)
    }

    /// Datasets a user can pick for visualization.
    #[must_use]
    pub const fn selectable() -> &'static [Self] {
        &[Self::Mdp, Self::Fromto]
    }
}

/// Error returned when a numeric wire code does not map to a known variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidCodeError {
    /// Name of the column the code came from.
    pub column: &'static str,
    /// The unrecognized code.
    pub code: i64,
}

impl std::fmt::Display for InvalidCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {} code {}", self.column, self.code)
    }
}

impl std::error::Error for InvalidCodeError {}

/// Day-type aggregation (`dayflag` column).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayFlag {
    /// Weekends and public holidays.
    Holiday = 0,
    /// Weekdays.
    Weekday = 1,
    /// Every day of the month.
    #[default]
    AllDays = 2,
}

impl DayFlag {
    /// Column name in the source CSV files.
    pub const COLUMN: &'static str = "dayflag";

    /// Wire code used in the CSV files.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Parses a wire code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] if the code is not 0, 1 or 2.
    pub const fn from_code(code: i64) -> Result<Self, InvalidCodeError> {
        match code {
            0 => Ok(Self::Holiday),
            1 => Ok(Self::Weekday),
            2 => Ok(Self::AllDays),
            _ => Err(InvalidCodeError {
                column: Self::COLUMN,
                code,
            }),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Holiday => "休日",
            Self::Weekday => "平日",
            Self::AllDays => "全日",
        }
    }

    /// Returns all variants in wire-code order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Holiday, Self::Weekday, Self::AllDays]
    }
}

/// Aggregation window within a day (`timezone` column).
///
/// Not a geographic time zone: the source data calls its time-of-day
/// aggregation window a "timezone".
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeOfDay {
    /// Average of the 11:00 to 14:59 hourly counts.
    Daytime = 0,
    /// Average of the 01:00 to 04:59 hourly counts.
    LateNight = 1,
    /// Average of all 24 hourly counts.
    #[default]
    AllDay = 2,
}

impl TimeOfDay {
    /// Column name in the source CSV files.
    pub const COLUMN: &'static str = "timezone";

    /// Wire code used in the CSV files.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Parses a wire code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] if the code is not 0, 1 or 2.
    pub const fn from_code(code: i64) -> Result<Self, InvalidCodeError> {
        match code {
            0 => Ok(Self::Daytime),
            1 => Ok(Self::LateNight),
            2 => Ok(Self::AllDay),
            _ => Err(InvalidCodeError {
                column: Self::COLUMN,
                code,
            }),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daytime => "昼",
            Self::LateNight => "深夜",
            Self::AllDay => "全日",
        }
    }

    /// Returns all variants in wire-code order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Daytime, Self::LateNight, Self::AllDay]
    }
}

/// Locality tier of a flow's origin relative to the destination city
/// (`from_area` column).
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FromArea {
    /// Visitors living in the destination city itself.
    SameCity = 0,
    /// Same prefecture, different city.
    SamePrefecture = 1,
    /// Same macro-region, different prefecture.
    SameRegion = 2,
    /// Different macro-region.
    OtherRegion = 3,
}

impl FromArea {
    /// Column name in the source CSV files.
    pub const COLUMN: &'static str = "from_area";

    /// Wire code used in the CSV files.
    #[must_use]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Parses a wire code.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCodeError`] if the code is not in `0..=3`.
    pub const fn from_code(code: i64) -> Result<Self, InvalidCodeError> {
        match code {
            0 => Ok(Self::SameCity),
            1 => Ok(Self::SamePrefecture),
            2 => Ok(Self::SameRegion),
            3 => Ok(Self::OtherRegion),
            _ => Err(InvalidCodeError {
                column: Self::COLUMN,
                code,
            }),
        }
    }

    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SameCity => "同一市区町村",
            Self::SamePrefecture => "同一都道府県かつ自市区町村と異なる市町村",
            Self::SameRegion => "同一の地方ブロックかつ異なる都道府県",
            Self::OtherRegion => "異なる地方ブロック",
        }
    }

    /// Returns all variants in wire-code order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::SameCity,
            Self::SamePrefecture,
            Self::SameRegion,
            Self::OtherRegion,
        ]
    }
}

/// The prefectures and cities a user chose to look at.
///
/// Only used to pick which archives are fetched and which rows are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSelection {
    /// Prefecture codes (1-47). Archives are fetched for the first one.
    pub prefectures: Vec<u8>,
    /// City codes (JIS X 0402, e.g. `13101`). Empty means "no filter".
    pub cities: Vec<u32>,
}

impl RegionSelection {
    /// Creates a selection for a single prefecture with no city filter.
    #[must_use]
    pub fn prefecture(code: u8) -> Self {
        Self {
            prefectures: vec![code],
            cities: Vec::new(),
        }
    }

    /// Adds a city code to the selection.
    #[must_use]
    pub fn with_city(mut self, code: u32) -> Self {
        self.cities.push(code);
        self
    }

    /// The prefecture whose archives are fetched.
    #[must_use]
    pub fn primary_prefecture(&self) -> Option<u8> {
        self.prefectures.first().copied()
    }

    /// Initial map zoom for this selection: the whole prefecture when no
    /// city is picked, one city up close, several cities in between.
    #[must_use]
    pub const fn zoom_level(&self) -> u8 {
        match self.cities.len() {
            0 => 9,
            1 => 11,
            _ => 10,
        }
    }
}

/// Region-dependent parameters of a single archive fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionParams {
    /// Prefecture code (1-47).
    pub prefecture: u8,
    /// Month of the year (1-12).
    pub month: u8,
}
