//! Relational merge of two tables on a shared key column.
//!
//! Follows the usual data-frame merge conventions: the key column appears
//! once, other overlapping columns are disambiguated with a suffix pair,
//! and duplicate keys fan out into one output row per match. Nothing is
//! deduplicated; callers that need unique keys must check beforehand.

use polars::prelude::*;

use crate::{TableError, ensure_unique, has_column, require_column};

/// Centroid columns in the mesh reference table and their canonical names.
const CENTER_RENAMES: &[(&str, &str)] = &[("lat_center", "lat"), ("lon_center", "lon")];

/// Which rows a merge keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    /// Every left row, with nulls where the right side has no match.
    #[default]
    Left,
    /// Only rows whose key exists on both sides.
    Inner,
}

impl From<JoinKind> for JoinType {
    fn from(kind: JoinKind) -> Self {
        match kind {
            JoinKind::Left => Self::Left,
            JoinKind::Inner => Self::Inner,
        }
    }
}

/// Joins `left` and `right` on column `on`.
///
/// Non-key columns present in both tables are renamed with `suffixes.0`
/// (left) and `suffixes.1` (right). When `drop_shadow` is set, every column
/// whose name contains `suffixes.1` is removed afterwards; an empty second
/// suffix drops nothing. Finally `lat_center`/`lon_center` are renamed to
/// `lat`/`lon` when present.
///
/// Output rows follow left order; each left row repeats once per matching
/// right row. Null keys never match. Integer and float keys are compared
/// as floats, so `1` matches `1.0`.
///
/// # Errors
///
/// Returns [`TableError::MissingColumn`] if `on` is missing from either
/// side, or [`TableError::ColumnCollision`] if suffixing still leaves two
/// columns with the same name.
pub fn merge(
    left: &DataFrame,
    right: &DataFrame,
    on: &str,
    kind: JoinKind,
    suffixes: (&str, &str),
    drop_shadow: bool,
) -> Result<DataFrame, TableError> {
    require_column(left, on)?;
    require_column(right, on)?;

    let overlapping: Vec<String> = left
        .get_column_names()
        .into_iter()
        .filter(|c| *c != on && has_column(right, c))
        .map(ToString::to_string)
        .collect();

    let mut left = left.clone();
    let mut right = right.clone();
    for column in &overlapping {
        left.rename(column, &format!("{column}{}", suffixes.0))?;
        right.rename(column, &format!("{column}{}", suffixes.1))?;
    }

    let expected: Vec<String> = left
        .get_column_names()
        .into_iter()
        .chain(right.get_column_names().into_iter().filter(|c| *c != on))
        .map(ToString::to_string)
        .collect();
    ensure_unique(&expected)?;

    align_keys(&mut left, &mut right, on)?;

    let mut merged = left.join(&right, [on], [on], JoinArgs::new(kind.into()))?;

    log::debug!(
        "Merged on {on} ({kind:?}): {} left rows, {} right rows -> {} rows",
        left.height(),
        right.height(),
        merged.height()
    );

    if drop_shadow && !suffixes.1.is_empty() {
        let shadows: Vec<String> = merged
            .get_column_names()
            .into_iter()
            .filter(|c| c.contains(suffixes.1))
            .map(ToString::to_string)
            .collect();
        for column in &shadows {
            merged.drop_in_place(column)?;
        }
    }

    for (from, to) in CENTER_RENAMES {
        if has_column(&merged, from) {
            if has_column(&merged, to) {
                merged.drop_in_place(to)?;
            }
            merged.rename(from, to)?;
        }
    }

    Ok(merged)
}

/// Gives both key columns one dtype when they differ.
///
/// Mixed numeric keys are compared as `f64`. A key column with no values at
/// all (inferred as text) takes the other side's dtype.
fn align_keys(left: &mut DataFrame, right: &mut DataFrame, on: &str) -> Result<(), TableError> {
    let left_dtype = left.column(on)?.dtype().clone();
    let right_dtype = right.column(on)?.dtype().clone();
    if left_dtype == right_dtype {
        return Ok(());
    }

    let all_null = |df: &DataFrame| -> Result<bool, TableError> {
        let key = df.column(on)?;
        Ok(key.null_count() == key.len())
    };

    let target = if left_dtype.is_numeric() && right_dtype.is_numeric() {
        DataType::Float64
    } else if all_null(&*left)? {
        right_dtype
    } else if all_null(&*right)? {
        left_dtype
    } else {
        // Let the join report the mismatch.
        return Ok(());
    };

    for df in [left, right] {
        let key = df.column(on)?.cast(&target)?;
        df.with_column(key)?;
    }
    Ok(())
}
