#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dashboard pipelines.
//!
//! A [`PipelineContext`] owns everything that outlives a single run: the
//! fetcher and its cache, the map composer, the optional region master,
//! and the progress reporter. A [`PipelineRequest`] describes one run.
//! [`run`] dispatches on the requested dataset:
//!
//! * `mdp` produces a [`MapArtifact`] comparing population and its change;
//! * `fromto` produces the labelled flow tables of both years.

pub mod flow;
pub mod mesh;

use std::sync::Arc;

use mobility_map_compose::{DisplayError, MapArtifact, MapComposer};
use mobility_map_dataset_models::{DatasetKey, DayFlag, RegionParams, RegionSelection, TimeOfDay};
use mobility_map_geography::{GeometryError, RegionMaster};
use mobility_map_source::progress::{ProgressCallback, null_progress};
use mobility_map_source::{DatasetFetcher, FetchError, HttpTransport, Transport};
use mobility_map_table::{DataFrame, Series, TableError, require_column};
use polars::prelude::{IntoLazy, NamedFrom, col, lit};
use thiserror::Error;

pub use flow::{FlowTables, run_flow_tables};
pub use mesh::run_mesh_comparison;

const FETCH_FAILED: &str = "データの取得に失敗しました";
const CITY_COLUMN: &str = "citycode";

/// Errors that stop a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fetching a dataset failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A table operation failed, usually a column the data lacks.
    #[error(transparent)]
    Table(#[from] TableError),

    /// Polygons could not be built.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The map cannot be shown.
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// The request cannot be run as given.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// What is wrong with the request.
        message: String,
    },
}

impl PipelineError {
    /// Message shown to the person running the dashboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(FetchError::Network { .. }) => {
                format!("{FETCH_FAILED}: ネットワークエラーが発生しました")
            }
            Self::Fetch(FetchError::ArchiveFormat { .. } | FetchError::Parse { .. }) => {
                format!("{FETCH_FAILED}: ファイル形式が正しくありません")
            }
            Self::Fetch(FetchError::NoDataFound { .. }) | Self::Table(_) | Self::Geometry(_) => {
                format!("{FETCH_FAILED}: ファイルに必要なデータが見つかりませんでした")
            }
            Self::Display(_) => "地図表示できません。".to_string(),
            Self::Fetch(FetchError::MissingRegion { .. }) => {
                "都道府県を選択してください。".to_string()
            }
            Self::InvalidRequest { message } => message.clone(),
        }
    }
}

/// One pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRequest {
    /// `mdp` or `fromto`.
    pub dataset: DatasetKey,
    /// Prefectures and cities to show; the first prefecture is fetched.
    pub selection: RegionSelection,
    /// Month of the year (1-12).
    pub month: u8,
    /// Day type to keep.
    pub day: DayFlag,
    /// Time of day to keep.
    pub time: TimeOfDay,
    /// Year compared against.
    pub baseline_year: u16,
    /// Year being compared.
    pub current_year: u16,
}

impl PipelineRequest {
    /// A request with the default filters and years 2020 → 2021.
    #[must_use]
    pub fn new(dataset: DatasetKey, selection: RegionSelection, month: u8) -> Self {
        Self {
            dataset,
            selection,
            month,
            day: DayFlag::default(),
            time: TimeOfDay::default(),
            baseline_year: 2020,
            current_year: 2021,
        }
    }

    /// Fetch parameters of the primary prefecture.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidRequest`] if no prefecture is
    /// selected, the month is out of range, or both years are the same.
    pub fn region_params(&self) -> Result<RegionParams, PipelineError> {
        let invalid = |message: &str| PipelineError::InvalidRequest {
            message: message.to_string(),
        };

        let prefecture = self
            .selection
            .primary_prefecture()
            .ok_or_else(|| invalid("都道府県を選択してください。"))?;
        if !(1..=12).contains(&self.month) {
            return Err(invalid("月は 1 から 12 の範囲で指定してください。"));
        }
        if self.baseline_year == self.current_year {
            return Err(invalid("比較する 2 つの年が同じです。"));
        }

        Ok(RegionParams {
            prefecture,
            month: self.month,
        })
    }

    /// Keeps rows of the selected cities (all when none are selected), day
    /// type, and time of day.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::MissingColumn`] if `citycode`, `dayflag`, or
    /// `timezone` is missing.
    pub fn filter(&self, df: &DataFrame) -> Result<DataFrame, TableError> {
        for column in [CITY_COLUMN, DayFlag::COLUMN, TimeOfDay::COLUMN] {
            require_column(df, column)?;
        }

        let mut predicate = col(DayFlag::COLUMN)
            .eq(lit(self.day.code()))
            .and(col(TimeOfDay::COLUMN).eq(lit(self.time.code())));
        if !self.selection.cities.is_empty() {
            let cities: Vec<i64> = self.selection.cities.iter().map(|&c| i64::from(c)).collect();
            predicate = predicate.and(col(CITY_COLUMN).is_in(lit(Series::new("cities", cities))));
        }

        let filtered = df.clone().lazy().filter(predicate).collect()?;

        log::debug!(
            "Filtered {} rows to {} ({} cities, {}, {})",
            df.height(),
            filtered.height(),
            self.selection.cities.len(),
            self.day.label(),
            self.time.label()
        );
        Ok(filtered)
    }
}

/// Long-lived state shared by pipeline runs.
pub struct PipelineContext<T: Transport = HttpTransport> {
    /// Dataset fetcher and its cache.
    pub fetcher: DatasetFetcher<T>,
    /// Map composer.
    pub composer: MapComposer,
    /// City names for flow tables.
    pub region_master: Option<RegionMaster>,
    /// Progress reporter.
    pub progress: Arc<dyn ProgressCallback>,
}

impl<T: Transport> std::fmt::Debug for PipelineContext<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("fetcher", &self.fetcher)
            .field("composer", &self.composer)
            .field("region_master", &self.region_master.as_ref().map(RegionMaster::len))
            .finish_non_exhaustive()
    }
}

impl<T: Transport> PipelineContext<T> {
    /// Creates a context with the default composer and no region master.
    #[must_use]
    pub fn new(fetcher: DatasetFetcher<T>) -> Self {
        Self {
            fetcher,
            composer: MapComposer::default(),
            region_master: None,
            progress: null_progress(),
        }
    }

    /// Replaces the composer.
    #[must_use]
    pub fn with_composer(mut self, composer: MapComposer) -> Self {
        self.composer = composer;
        self
    }

    /// Sets the region master used to name cities.
    #[must_use]
    pub fn with_region_master(mut self, master: RegionMaster) -> Self {
        self.region_master = Some(master);
        self
    }

    /// Reports map creation through `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = progress;
        self
    }
}

/// What a run produced.
#[derive(Debug, Clone)]
pub enum PipelineOutput {
    /// Comparison map of the mesh dataset.
    Map(Box<MapArtifact>),
    /// Labelled flow tables.
    FlowTables(FlowTables),
}

/// Runs the pipeline for `request.dataset`.
///
/// # Errors
///
/// Returns [`PipelineError`] if the request is invalid, a fetch fails, or
/// the map cannot be displayed.
pub async fn run<T: Transport>(
    ctx: &PipelineContext<T>,
    request: &PipelineRequest,
) -> Result<PipelineOutput, PipelineError> {
    match request.dataset {
        DatasetKey::Mdp => Ok(PipelineOutput::Map(Box::new(
            run_mesh_comparison(ctx, request).await?,
        ))),
        DatasetKey::Fromto => Ok(PipelineOutput::FlowTables(
            run_flow_tables(ctx, request).await?,
        )),
        DatasetKey::Mesh1km => Err(PipelineError::InvalidRequest {
            message: format!("{} はデータセットとして選択できません。", request.dataset),
        }),
    }
}


#[cfg(test)]
mod tests {
    use mobility_map_source::NetworkError;
    use mobility_map_table::read_csv;

    use super::testing::*;
    use super::*;

    #[test]
    fn user_messages_follow_error_kind() {
        let network = PipelineError::Fetch(FetchError::Network {
            path: "x".to_string(),
            source: NetworkError::Status { status: 404 },
        });
        assert_eq!(
            network.user_message(),
            "データの取得に失敗しました: ネットワークエラーが発生しました"
        );

        let format = PipelineError::Fetch(FetchError::ArchiveFormat {
            path: "x".to_string(),
            message: "bad".to_string(),
        });
        assert_eq!(
            format.user_message(),
            "データの取得に失敗しました: ファイル形式が正しくありません"
        );

        let no_data = PipelineError::Fetch(FetchError::NoDataFound {
            path: "x".to_string(),
        });
        assert_eq!(
            no_data.user_message(),
            "データの取得に失敗しました: ファイルに必要なデータが見つかりませんでした"
        );

        let display = PipelineError::Display(DisplayError::NoCenter);
        assert_eq!(display.user_message(), "地図表示できません。");
    }

    #[test]
    fn request_validation() {
        let mut request = tokyo_april(DatasetKey::Mdp);
        assert_eq!(
            request.region_params().unwrap(),
            RegionParams {
                prefecture: 13,
                month: 4
            }
        );

        request.month = 13;
        assert!(request.region_params().is_err());

        request.month = 4;
        request.current_year = 2020;
        assert!(request.region_params().is_err());

        let empty = PipelineRequest::new(DatasetKey::Mdp, RegionSelection::default(), 4);
        assert!(matches!(
            empty.region_params(),
            Err(PipelineError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn filter_keeps_selected_city_and_flags() {
        let table = read_csv(MDP_2020.as_bytes()).unwrap();
        let mut request = tokyo_april(DatasetKey::Mdp);

        assert_eq!(request.filter(&table).unwrap().height(), 3);

        request.selection = request.selection.with_city(13101);
        assert_eq!(request.filter(&table).unwrap().height(), 2);

        request.day = DayFlag::Holiday;
        request.time = TimeOfDay::Daytime;
        let filtered = request.filter(&table).unwrap();
        assert_eq!(filtered.height(), 1);
        let population = filtered.column("population").unwrap().i64().unwrap();
        assert_eq!(population.get(0), Some(999));
    }

    #[test]
    fn filter_requires_flag_columns() {
        let table = read_csv("citycode,dayflag,population\n13101,2,5\n".as_bytes()).unwrap();

        let err = tokyo_april(DatasetKey::Mdp).filter(&table).unwrap_err();

        assert!(matches!(err, TableError::MissingColumn { column } if column == "timezone"));
    }

    #[tokio::test]
    async fn dispatches_on_dataset() {
        let ctx = context(mesh_transport());

        let output = run(&ctx, &tokyo_april(DatasetKey::Mdp)).await.unwrap();
        assert!(matches!(output, PipelineOutput::Map(_)));

        let err = run(&ctx, &tokyo_april(DatasetKey::Mesh1km))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidRequest { .. }));
    }
}
