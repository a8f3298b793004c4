//! Data cleaning for the election record table.
//!
//! The cleaner applies a fixed sequence of steps:
//! 1. Fill missing `pc_type` and `cand_sex` with "Unknown"
//! 2. Drop rows that still contain a missing value
//! 3. Drop exact-duplicate rows
//! 4. Normalize party, constituency and state names
//! 5. Remap candidate-sex codes to Male/Female/Unknown
//! 6. Coerce vote and elector counts to numeric
//! 7. Optionally drop rows whose counts are missing or negative
//!
//! The fill must happen before the drop: only the two labelled columns get a
//! default, every other gap removes the row.

mod converters;
mod normalizers;
mod sanitizers;

pub use normalizers::canonical_sex;

use crate::types::{CleaningStats, SEX_UNKNOWN, columns};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Columns that receive the "Unknown" fallback instead of dropping the row.
pub const FILL_COLUMNS: [&str; 2] = [columns::PC_TYPE, columns::CAND_SEX];

/// Columns whose names are title-cased.
pub const NAME_COLUMNS: [&str; 3] = [columns::PARTYNAME, columns::PC_NAME, columns::ST_NAME];

/// Columns coerced to `Float64`.
pub const COUNT_COLUMNS: [&str; 2] = [columns::TOTVOTPOLL, columns::ELECTORS];

/// Output of [`DataCleaner::clean`].
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub data: DataFrame,
    pub stats: CleaningStats,
    pub actions: Vec<String>,
}

/// Data cleaner for the election record table.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    drop_invalid_numeric: bool,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DataCleaner {
    pub fn new(drop_invalid_numeric: bool) -> Self {
        Self {
            drop_invalid_numeric,
        }
    }

    /// Run every cleaning step in order.
    pub fn clean(&self, df: DataFrame) -> Result<CleaningOutcome> {
        let mut stats = CleaningStats {
            rows_loaded: df.height(),
            ..Default::default()
        };
        let mut actions = Vec::new();

        info!("Cleaning {} rows...", df.height());

        // 1. Fallback labels
        let (df, filled) = sanitizers::fill_missing_labels(df, &FILL_COLUMNS, SEX_UNKNOWN)?;
        if filled.is_empty() {
            actions.push("No missing pc_type or cand_sex values to fill".to_string());
        } else {
            for (col, count) in &filled {
                actions.push(format!("Filled {} missing '{}' values with 'Unknown'", count, col));
            }
        }
        stats.nulls_filled = filled;

        // 2. Remaining nulls
        let before = df.height();
        let (df, dropped) = sanitizers::drop_null_rows(df)?;
        stats.rows_dropped_null = dropped;
        actions.push(if dropped > 0 {
            format!(
                "Dropped {} rows with missing values ({:.1}%)",
                dropped,
                percentage(dropped, before)
            )
        } else {
            "No rows with missing values found".to_string()
        });

        // 3. Duplicates
        let before = df.height();
        let (df, duplicates) = sanitizers::drop_duplicate_rows(df)?;
        stats.duplicates_removed = duplicates;
        actions.push(if duplicates > 0 {
            format!(
                "Removed {} duplicate rows ({:.1}%)",
                duplicates,
                percentage(duplicates, before)
            )
        } else {
            "No duplicate rows found".to_string()
        });

        // 4. Names
        let (df, normalized) = normalizers::normalize_name_columns(df, &NAME_COLUMNS)?;
        stats.values_normalized = normalized;
        actions.push(format!(
            "Normalized {} party, constituency and state names",
            normalized
        ));

        // 5. Sex codes
        let (df, remapped) = normalizers::remap_sex_codes(df, columns::CAND_SEX)?;
        stats.sex_codes_remapped = remapped;
        actions.push(format!("Remapped {} candidate sex codes", remapped));

        // 6. Numeric coercion
        let mut df = df;
        for column in COUNT_COLUMNS {
            let (converted, coerced) = converters::coerce_to_float(df, column)?;
            df = converted;
            if coerced > 0 {
                actions.push(format!(
                    "Coerced {} unparseable '{}' values to missing",
                    coerced, column
                ));
            }
            stats
                .values_coerced_to_null
                .insert(column.to_string(), coerced);
        }

        // 7. Validation sweep
        if self.drop_invalid_numeric {
            let (swept, removed) = converters::drop_invalid_counts(df, &COUNT_COLUMNS)?;
            df = swept;
            stats.rows_dropped_invalid_numeric = removed;
            if removed > 0 {
                actions.push(format!(
                    "Dropped {} rows with missing or negative vote/elector counts",
                    removed
                ));
            }
        } else {
            debug!("Skipping numeric validation sweep");
        }

        stats.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows",
            stats.rows_loaded, stats.rows_after
        );

        Ok(CleaningOutcome {
            data: df,
            stats,
            actions,
        })
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
