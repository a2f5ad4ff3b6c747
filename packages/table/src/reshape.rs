//! Derived columns.

use polars::prelude::*;

use crate::{TableError, require_column};

/// Adds column `output = current / baseline - 1`, the year-over-year
/// relative change.
///
/// Rows where either input is null or the baseline is zero get a null,
/// which callers drop before building geometry.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if an input column is missing.
pub fn with_change_ratio(
    df: &DataFrame,
    current: &str,
    baseline: &str,
    output: &str,
) -> Result<DataFrame, TableError> {
    require_column(df, current)?;
    require_column(df, baseline)?;

    let current_value = col(current).cast(DataType::Float64);
    let baseline_value = col(baseline).cast(DataType::Float64);

    let ratio = when(baseline_value.clone().eq(lit(0.0)))
        .then(lit(NULL))
        .otherwise(current_value / baseline_value - lit(1.0))
        .alias(output);

    let df = df.clone().lazy().with_column(ratio).collect()?;

    let missing = df.column(output)?.null_count();
    if missing > 0 {
        log::debug!("{missing} rows have no {output} ({current} / {baseline})");
    }

    Ok(df)
}
