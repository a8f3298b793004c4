//! Text normalization for names and categorical codes.

use crate::types::{SEX_FEMALE, SEX_MALE, SEX_UNKNOWN};
use crate::utils::normalize_name;
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Map a raw candidate-sex code to its canonical label.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Codes
/// outside the known set fall back to `Unknown`.
pub fn canonical_sex(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "m" | "male" => SEX_MALE,
        "f" | "female" => SEX_FEMALE,
        _ => SEX_UNKNOWN,
    }
}

/// Replace underscores with spaces and title-case the given columns.
///
/// Returns the number of cells whose value changed.
pub(crate) fn normalize_name_columns(df: DataFrame, columns: &[&str]) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let mut changed = 0;

    for &col_name in columns {
        let series = df.column(col_name)?.as_materialized_series();
        let mut col_changed = 0;
        let values: Vec<Option<String>> = series
            .str()?
            .into_iter()
            .map(|opt| {
                opt.map(|v| {
                    let normalized = normalize_name(v);
                    if normalized != v {
                        col_changed += 1;
                    }
                    normalized
                })
            })
            .collect();

        if col_changed > 0 {
            df.replace(col_name, Series::new(col_name.into(), values))?;
            debug!("Normalized {} values in '{}'", col_changed, col_name);
            changed += col_changed;
        }
    }

    Ok((df, changed))
}

/// Rewrite a sex column to the closed set {Male, Female, Unknown}.
///
/// Returns the number of cells whose value changed.
pub(crate) fn remap_sex_codes(df: DataFrame, column: &str) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let series = df.column(column)?.as_materialized_series();

    let mut remapped = 0;
    let values: Vec<Option<&'static str>> = series
        .str()?
        .into_iter()
        .map(|opt| {
            opt.map(|v| {
                let canonical = canonical_sex(v);
                if canonical != v {
                    remapped += 1;
                }
                canonical
            })
        })
        .collect();

    df.replace(column, Series::new(column.into(), values))?;
    debug!("Remapped {} '{}' codes", remapped, column);
    Ok((df, remapped))
}
