#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular data for the mobility pipelines.
//!
//! Tables are polars [`DataFrame`]s. This crate loads them from CSV, writes
//! them back out, and provides the column checks, the relational [`merge`],
//! and the derived columns in [`reshape`] that the pipelines share. Every
//! operation returns a new frame; borrowed inputs are never modified.

pub mod merge;
pub mod reshape;

use std::io::{Cursor, Read, Write};

use polars::prelude::*;

pub use merge::{JoinKind, merge};
pub use polars::prelude::{DataFrame, PolarsError, Series};

/// Errors that can occur while loading or reshaping tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// A referenced column does not exist.
    #[error("Missing column: {column}")]
    MissingColumn {
        /// Name of the missing column.
        column: String,
    },

    /// An operation would produce two columns with the same name.
    #[error("Duplicate column: {column}")]
    ColumnCollision {
        /// The duplicated column name.
        column: String,
    },

    /// Reading the CSV source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars rejected the data or the operation.
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Reads a comma-delimited CSV with a header row.
///
/// Column types are inferred from every row: integers become `i64`, other
/// numbers `f64`, anything else text. Empty cells are null.
///
/// # Errors
///
/// Returns [`TableError`] if the source cannot be read or is not CSV.
pub fn read_csv<R: Read>(mut reader: R) -> Result<DataFrame, TableError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    log::trace!("Read CSV with shape {:?}", df.shape());
    Ok(df)
}

/// Writes `df` as CSV with a header row.
///
/// # Errors
///
/// Returns [`TableError::Polars`] if writing fails.
pub fn write_csv<W: Write>(df: &mut DataFrame, writer: W) -> Result<(), TableError> {
    CsvWriter::new(writer).include_header(true).finish(df)?;
    Ok(())
}

/// Column `name` of `df`.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if there is no such column.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series, TableError> {
    df.column(name).map_err(|_| TableError::MissingColumn {
        column: name.to_string(),
    })
}

/// Whether `df` has a column called `name`.
#[must_use]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Column `name` cast to `f64`. Nulls and non-numeric cells become `None`.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if there is no such column.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, TableError> {
    let floats = require_column(df, name)?.cast(&DataType::Float64)?;
    Ok(floats.f64()?.into_iter().collect())
}

/// Rows of `df` where none of `columns` is null.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if a column does not exist.
pub fn drop_nulls(df: &DataFrame, columns: &[&str]) -> Result<DataFrame, TableError> {
    for column in columns {
        require_column(df, column)?;
    }
    let kept = df.drop_nulls(Some(columns))?;

    let dropped = df.height() - kept.height();
    if dropped > 0 {
        log::debug!("Dropped {dropped} rows with null {columns:?}");
    }
    Ok(kept)
}

/// Replaces the integer codes in `column` with text from `lookup`.
///
/// A code `lookup` does not know is kept as its decimal text, so the
/// column stays readable either way. Null cells stay null.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if there is no such column.
pub fn relabel<F>(df: &DataFrame, column: &str, lookup: F) -> Result<DataFrame, TableError>
where
    F: Fn(i64) -> Option<String>,
{
    let codes = require_column(df, column)?.cast(&DataType::Int64)?;
    let labels: Vec<Option<String>> = codes
        .i64()?
        .into_iter()
        .map(|code| code.map(|c| lookup(c).unwrap_or_else(|| c.to_string())))
        .collect();

    let mut relabelled = df.clone();
    relabelled.with_column(Series::new(column, labels))?;
    Ok(relabelled)
}

pub(crate) fn ensure_unique(columns: &[String]) -> Result<(), TableError> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(TableError::ColumnCollision {
                column: column.clone(),
            });
        }
    }
    Ok(())
}
