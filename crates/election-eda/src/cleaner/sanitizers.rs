//! Missing-value and duplicate handling.

use anyhow::Result;
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Replace nulls in the given string columns with `label`.
///
/// Returns the number of cells filled per column; columns without nulls are
/// left untouched and omitted from the map.
pub(crate) fn fill_missing_labels(
    df: DataFrame,
    columns: &[&str],
    label: &str,
) -> Result<(DataFrame, BTreeMap<String, usize>)> {
    let mut df = df;
    let mut filled = BTreeMap::new();

    for &col_name in columns {
        let series = df.column(col_name)?.as_materialized_series();
        let missing = series.null_count();
        if missing == 0 {
            continue;
        }

        let values: Vec<&str> = series
            .str()?
            .into_iter()
            .map(|opt| opt.unwrap_or(label))
            .collect();
        let series = Series::new(col_name.into(), values);
        df.replace(col_name, series)?;

        debug!("Filled {} missing '{}' values with '{}'", missing, col_name, label);
        filled.insert(col_name.to_string(), missing);
    }

    Ok((df, filled))
}

/// Remove every row that still has a null in any column.
pub(crate) fn drop_null_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
    let before = df.height();
    let mut mask: Option<BooleanChunked> = None;

    for col in df.get_columns() {
        if col.null_count() == 0 {
            continue;
        }
        let not_null = col.as_materialized_series().is_not_null();
        mask = Some(match mask {
            Some(acc) => &acc & &not_null,
            None => not_null,
        });
    }

    let df = match mask {
        Some(mask) => df.filter(&mask)?,
        None => df,
    };

    let removed = before - df.height();
    debug!("Dropped {} rows with missing values", removed);
    Ok((df, removed))
}

/// Remove exact-duplicate rows, keeping the first occurrence in input order.
pub(crate) fn drop_duplicate_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
    let before = df.height();
    let df = df.unique_stable(None, UniqueKeepStrategy::First, None)?;
    let removed = before - df.height();
    debug!("Removed {} duplicate rows", removed);
    Ok((df, removed))
}
