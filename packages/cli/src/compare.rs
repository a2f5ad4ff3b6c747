//! The `compare` subcommand.

use std::path::{Path, PathBuf};

use chrono::Datelike as _;
use clap::Args;
use mobility_map_cli_utils::{IndicatifProgress, MultiProgress};
use mobility_map_compose::{CompareMode, DisplayError, MapComposer};
use mobility_map_dataset_models::{DatasetKey, DayFlag, RegionSelection, TimeOfDay};
use mobility_map_geography::{GeometryError, RegionMaster};
use mobility_map_pipeline::{
    FlowTables, PipelineContext, PipelineError, PipelineOutput, PipelineRequest,
    run as run_pipeline,
};
use mobility_map_source::cache::Cache;
use mobility_map_source::{ConfigError, DatasetFetcher, NetworkError, SourceConfig};
use mobility_map_table::{DataFrame, TableError, write_csv};
use thiserror::Error;

#[derive(Args)]
pub struct CompareArgs {
    /// Prefecture code (1-47); repeatable, archives are fetched for the first
    #[arg(long = "prefecture", required = true, value_parser = clap::value_parser!(u8).range(1..=47))]
    prefectures: Vec<u8>,
    /// City code to keep (e.g. 13101); repeatable, all cities when omitted
    #[arg(long = "city")]
    cities: Vec<u32>,
    /// Dataset to compare (`mdp` or `fromto`)
    #[arg(long, default_value = "mdp")]
    dataset: DatasetKey,
    /// Month of the year (1-12). Default: the current month
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
    month: Option<u8>,
    /// Day type: 0 holiday, 1 weekday, 2 all days
    #[arg(long, default_value = "2", value_parser = parse_dayflag)]
    dayflag: DayFlag,
    /// Time of day: 0 daytime, 1 late night, 2 all day
    #[arg(long, default_value = "2", value_parser = parse_timezone)]
    timezone: TimeOfDay,
    /// Map layout: `linked`, `side-by-side`, or `swipe`
    #[arg(long, default_value = "linked")]
    mode: CompareMode,
    /// Year compared against
    #[arg(long, default_value = "2020")]
    baseline_year: u16,
    /// Year being compared
    #[arg(long, default_value = "2021")]
    current_year: u16,
    /// TOML config with a `[blob]` table. Default: `MOBILITY_MAP_BLOB_*` env vars
    #[arg(long)]
    config: Option<PathBuf>,
    /// Region master CSV used to name cities in flow tables
    #[arg(long)]
    region_master: Option<PathBuf>,
    /// Keep at most this many downloaded tables in memory
    #[arg(long)]
    cache_capacity: Option<usize>,
    /// Output HTML map (mdp); flow tables (fromto) are written beside it
    #[arg(long, default_value = "mobility_map.html")]
    output: PathBuf,
    /// Also write the map description as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

fn parse_dayflag(s: &str) -> Result<DayFlag, String> {
    let code: i64 = s.parse().map_err(|_| format!("not a number: {s}"))?;
    DayFlag::from_code(code).map_err(|e| e.to_string())
}

fn parse_timezone(s: &str) -> Result<TimeOfDay, String> {
    let code: i64 = s.parse().map_err(|_| format!("not a number: {s}"))?;
    TimeOfDay::from_code(code).map_err(|e| e.to_string())
}

/// Errors of the `compare` subcommand.
#[derive(Debug, Error)]
pub enum CliError {
    /// Blob storage settings are missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The HTTP client could not be created.
    #[error(transparent)]
    Client(#[from] NetworkError),

    /// The region master could not be loaded.
    #[error(transparent)]
    RegionMaster(#[from] GeometryError),

    /// The pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// The map could not be serialized.
    #[error(transparent)]
    Display(#[from] DisplayError),

    /// A flow table could not be written.
    #[error(transparent)]
    Table(#[from] TableError),

    /// An output file could not be written.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

impl CliError {
    /// Message printed to stderr.
    pub fn user_message(&self) -> String {
        match self {
            Self::Pipeline(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Runs `compare` and writes its outputs.
pub async fn run(args: CompareArgs, multi: &MultiProgress) -> Result<(), CliError> {
    let config = match &args.config {
        Some(path) => SourceConfig::from_file(path)?,
        None => SourceConfig::from_env()?,
    };
    log::debug!("Using {config:?}");

    let progress = IndicatifProgress::spinner(multi, "Starting...");

    let mut fetcher = DatasetFetcher::from_config(config)?.with_progress(progress.clone());
    if let Some(capacity) = args.cache_capacity {
        fetcher = fetcher.with_cache(Cache::with_capacity(capacity));
    }

    let mut ctx = PipelineContext::new(fetcher)
        .with_composer(MapComposer::new(args.mode))
        .with_progress(progress.clone());
    if let Some(path) = &args.region_master {
        ctx = ctx.with_region_master(RegionMaster::from_path(path)?);
    }

    let month = args.month.unwrap_or_else(current_month);
    let mut selection = RegionSelection {
        prefectures: args.prefectures.clone(),
        cities: Vec::new(),
    };
    for city in &args.cities {
        selection = selection.with_city(*city);
    }

    let request = PipelineRequest {
        dataset: args.dataset,
        selection,
        month,
        day: args.dayflag,
        time: args.timezone,
        baseline_year: args.baseline_year,
        current_year: args.current_year,
    };
    log::info!(
        "Comparing {} for prefecture(s) {:?}, month {month}, {} / {}",
        request.dataset,
        request.selection.prefectures,
        request.day.label(),
        request.time.label()
    );

    let output = run_pipeline(&ctx, &request).await;
    progress.finish_and_clear();

    match output? {
        PipelineOutput::Map(artifact) => {
            write_file(&args.output, &artifact.to_html()?)?;
            log::info!("Wrote map to {}", args.output.display());
            if let Some(path) = &args.json {
                write_file(path, &artifact.to_json()?)?;
                log::info!("Wrote map description to {}", path.display());
            }
        }
        PipelineOutput::FlowTables(flows) => write_flows(&args.output, flows)?,
    }

    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn current_month() -> u8 {
    chrono::Local::now().month() as u8
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        source: e,
    })
}

fn write_flows(output: &Path, flows: FlowTables) -> Result<(), CliError> {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("mobility_map");

    for (year, mut df) in [
        (flows.baseline_year, flows.baseline),
        (flows.current_year, flows.current),
    ] {
        let path = output.with_file_name(format!("{stem}_fromto_{year}.csv"));
        write_table(&path, &mut df)?;
        log::info!("Wrote {} flow rows to {}", df.height(), path.display());
    }
    Ok(())
}

fn write_table(path: &Path, df: &mut DataFrame) -> Result<(), CliError> {
    let file = std::fs::File::create(path).map_err(|e| CliError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    write_csv(df, std::io::BufWriter::new(file))?;
    Ok(())
}
