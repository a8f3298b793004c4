//! Numeric coercion for vote and elector counts.

use crate::utils::{is_numeric_dtype, parse_count};
use anyhow::{Context, Result, bail};
use polars::prelude::*;
use tracing::{debug, warn};

/// Convert a column to `Float64`.
///
/// String cells that do not parse as a finite number become null. Nothing is
/// dropped here. Returns the number of non-null cells that were coerced to null.
pub(crate) fn coerce_to_float(df: DataFrame, column: &str) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let series = df
        .column(column)
        .with_context(|| format!("Column '{}' missing during numeric coercion", column))?
        .as_materialized_series();

    let (converted, coerced) = match series.dtype() {
        DataType::String => {
            let mut coerced = 0;
            let values: Vec<Option<f64>> = series
                .str()?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|raw| {
                        let parsed = parse_count(raw);
                        if parsed.is_none() {
                            coerced += 1;
                        }
                        parsed
                    })
                })
                .collect();
            (Series::new(column.into(), values), coerced)
        }
        dtype if is_numeric_dtype(dtype) => (series.cast(&DataType::Float64)?, 0),
        other => bail!("Cannot coerce column '{}' of type {} to numeric", column, other),
    };

    df.replace(column, converted)?;
    if coerced > 0 {
        warn!("Coerced {} unparseable '{}' values to null", coerced, column);
    } else {
        debug!("Converted '{}' to Float64", column);
    }
    Ok((df, coerced))
}

/// Drop rows whose value in any of `columns` is null or negative.
///
/// The columns must already be `Float64`.
pub(crate) fn drop_invalid_counts(df: DataFrame, columns: &[&str]) -> Result<(DataFrame, usize)> {
    let before = df.height();
    let mut keep = vec![true; before];

    for &col_name in columns {
        let values = df.column(col_name)?.as_materialized_series().f64()?;
        for (slot, value) in keep.iter_mut().zip(values.into_iter()) {
            if !matches!(value, Some(v) if v >= 0.0) {
                *slot = false;
            }
        }
    }

    let mask: BooleanChunked = keep.into_iter().collect();
    let df = df.filter(&mask)?;
    let removed = before - df.height();
    if removed > 0 {
        warn!("Dropped {} rows with missing or negative counts", removed);
    }
    Ok((df, removed))
}
