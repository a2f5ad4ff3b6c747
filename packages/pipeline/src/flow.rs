//! City-level visitor flows, labelled for reading.

use mobility_map_dataset_models::{DatasetKey, DayFlag, FromArea, TimeOfDay};
use mobility_map_geography::RegionMaster;
use mobility_map_geography_models::prefecture::prefecture_name;
use mobility_map_source::Transport;
use mobility_map_table::{DataFrame, TableError, relabel, require_column};

use crate::{PipelineContext, PipelineError, PipelineRequest};

/// Flow tables of both compared years.
#[derive(Debug, Clone)]
pub struct FlowTables {
    /// Year of `baseline`.
    pub baseline_year: u16,
    /// Year of `current`.
    pub current_year: u16,
    /// Baseline-year flows.
    pub baseline: DataFrame,
    /// Current-year flows.
    pub current: DataFrame,
}

/// Fetches and filters both years of the flow dataset, then replaces codes
/// with labels and names.
///
/// # Errors
///
/// Returns [`PipelineError`] if a fetch fails or a coded column is missing.
pub async fn run_flow_tables<T: Transport>(
    ctx: &PipelineContext<T>,
    request: &PipelineRequest,
) -> Result<FlowTables, PipelineError> {
    let region = request.region_params()?;

    let current = ctx
        .fetcher
        .fetch(DatasetKey::Fromto, request.current_year, Some(region))
        .await?;
    let baseline = ctx
        .fetcher
        .fetch(DatasetKey::Fromto, request.baseline_year, Some(region))
        .await?;

    let master = ctx.region_master.as_ref();
    let current = label_codes(&request.filter(&current)?, master)?;
    let baseline = label_codes(&request.filter(&baseline)?, master)?;

    log::info!(
        "Flow tables: {} rows ({}), {} rows ({})",
        baseline.height(),
        request.baseline_year,
        current.height(),
        request.current_year
    );

    Ok(FlowTables {
        baseline_year: request.baseline_year,
        current_year: request.current_year,
        baseline,
        current,
    })
}

/// Replaces flag codes with labels and prefecture/city codes with names.
///
/// A code without a label or name is kept as its decimal text. City names
/// come from `master`; without one, the city column is left as is.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if a coded column is missing.
pub fn label_codes(df: &DataFrame, master: Option<&RegionMaster>) -> Result<DataFrame, TableError> {
    let label = |text: &str| Some(text.to_string());

    let df = relabel(df, DayFlag::COLUMN, |c| {
        DayFlag::from_code(c).ok().and_then(|f| label(f.label()))
    })?;
    let df = relabel(&df, TimeOfDay::COLUMN, |c| {
        TimeOfDay::from_code(c).ok().and_then(|t| label(t.label()))
    })?;
    let df = relabel(&df, FromArea::COLUMN, |c| {
        FromArea::from_code(c).ok().and_then(|a| label(a.label()))
    })?;
    let df = relabel(&df, "prefcode", |c| {
        u8::try_from(c).ok().and_then(prefecture_name).and_then(label)
    })?;

    match master {
        Some(master) => relabel(&df, "citycode", |c| {
            u32::try_from(c)
                .ok()
                .and_then(|c| master.city_name(c))
                .and_then(label)
        }),
        None => {
            require_column(&df, "citycode")?;
            Ok(df)
        }
    }
}

#[cfg(test)]
mod tests {
    use mobility_map_table::read_csv;

    use super::*;
    use crate::testing::*;

    fn text(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        df.column(column).unwrap().str().unwrap().get(row).map(str::to_string)
    }

    const FROMTO_2020: &str = "prefcode,citycode,year,month,dayflag,timezone,from_area,population\n\
        13,13101,2020,4,2,2,0,120\n\
        13,13101,2020,4,2,2,3,40\n\
        13,13102,2020,4,1,0,1,10\n";

    const FROMTO_2021: &str = "prefcode,citycode,year,month,dayflag,timezone,from_area,population\n\
        13,13101,2021,4,2,2,0,100\n\
        13,13199,2021,4,2,2,3,50\n";

    fn flow_transport() -> RoutedTransport {
        RoutedTransport::default()
            .route(
                "fromto/13/2020/04/monthly_fromto_city.csv.zip",
                &[("monthly_fromto_city.csv", FROMTO_2020)],
            )
            .route(
                "fromto/13/2021/04/monthly_fromto_city.csv.zip",
                &[("monthly_fromto_city.csv", FROMTO_2021)],
            )
    }

    fn master() -> RegionMaster {
        RegionMaster::from_csv_reader(
            "prefcode,prefname,citycode,cityname\n\
             13,東京都,13101,千代田区\n\
             13,東京都,13102,中央区\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn labels_filtered_rows_of_both_years() {
        let ctx = context(flow_transport()).with_region_master(master());

        let flows = run_flow_tables(&ctx, &tokyo_april(DatasetKey::Fromto))
            .await
            .unwrap();

        assert_eq!(flows.baseline_year, 2020);
        assert_eq!(flows.baseline.height(), 2);
        assert_eq!(flows.current.height(), 2);

        let first = |column: &str| text(&flows.baseline, column, 0);
        assert_eq!(first("dayflag").as_deref(), Some("全日"));
        assert_eq!(first("timezone").as_deref(), Some("全日"));
        assert_eq!(first("from_area").as_deref(), Some("同一市区町村"));
        assert_eq!(first("prefcode").as_deref(), Some("東京都"));
        assert_eq!(first("citycode").as_deref(), Some("千代田区"));

        // unknown city code stays a code
        assert_eq!(text(&flows.current, "citycode", 1).as_deref(), Some("13199"));
        assert_eq!(
            text(&flows.current, "from_area", 1).as_deref(),
            Some("異なる地方ブロック")
        );
    }

    #[test]
    fn without_master_city_codes_stay() {
        let table = read_csv(FROMTO_2021.as_bytes()).unwrap();

        let labelled = label_codes(&table, None).unwrap();

        let cities = labelled.column("citycode").unwrap().i64().unwrap();
        assert_eq!(cities.get(0), Some(13101));
        assert_eq!(text(&labelled, "dayflag", 0).as_deref(), Some("全日"));
    }

    #[test]
    fn unknown_flag_codes_stay() {
        let table = read_csv(
            "prefcode,citycode,dayflag,timezone,from_area\n99,1,7,8,9\n".as_bytes(),
        )
        .unwrap();

        let labelled = label_codes(&table, None).unwrap();

        let codes: Vec<Option<String>> = ["prefcode", "dayflag", "timezone", "from_area"]
            .into_iter()
            .map(|column| text(&labelled, column, 0))
            .collect();
        assert_eq!(
            codes,
            ["99", "7", "8", "9"].map(|c| Some(c.to_string()))
        );
    }

    #[test]
    fn missing_coded_column_is_an_error() {
        let table = read_csv("prefcode,citycode\n13,13101\n".as_bytes()).unwrap();

        assert!(label_codes(&table, None).is_err());
    }
}
