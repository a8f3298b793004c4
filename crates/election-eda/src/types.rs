use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Column names
// ============================================================================

/// Column names of the election record table.
pub mod columns {
    pub const ST_NAME: &str = "st_name";
    pub const YEAR: &str = "year";
    pub const PC_NO: &str = "pc_no";
    pub const PC_NAME: &str = "pc_name";
    pub const PC_TYPE: &str = "pc_type";
    pub const CAND_NAME: &str = "cand_name";
    pub const CAND_SEX: &str = "cand_sex";
    pub const PARTYNAME: &str = "partyname";
    pub const PARTYABBRE: &str = "partyabbre";
    pub const TOTVOTPOLL: &str = "totvotpoll";
    pub const ELECTORS: &str = "electors";

    /// Derived, never written to the cleaned CSV.
    pub const VOTER_TURNOUT: &str = "voter_turnout";
    /// Derived, never written to the cleaned CSV.
    pub const WINNING_MARGIN: &str = "winning_margin";

    /// Required input columns, in canonical output order.
    pub const REQUIRED: [&str; 11] = [
        ST_NAME, YEAR, PC_NO, PC_NAME, PC_TYPE, CAND_NAME, CAND_SEX, PARTYNAME, PARTYABBRE,
        TOTVOTPOLL, ELECTORS,
    ];
}

/// Canonical candidate sex labels.
pub const SEX_MALE: &str = "Male";
pub const SEX_FEMALE: &str = "Female";
pub const SEX_UNKNOWN: &str = "Unknown";

// ============================================================================
// Cleaning statistics
// ============================================================================

/// Counters collected while cleaning the table.
///
/// Maps are ordered so that serialized reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningStats {
    /// Rows in the table handed to the cleaner.
    pub rows_loaded: usize,
    /// Missing values replaced with a fallback label, per column.
    pub nulls_filled: BTreeMap<String, usize>,
    /// Rows removed because a column without fallback was missing.
    pub rows_dropped_null: usize,
    /// Exact-duplicate rows removed.
    pub duplicates_removed: usize,
    /// Text cells whose value changed during name normalization.
    pub values_normalized: usize,
    /// `cand_sex` cells rewritten to a canonical label.
    pub sex_codes_remapped: usize,
    /// Numeric cells that could not be parsed, per column.
    pub values_coerced_to_null: BTreeMap<String, usize>,
    /// Rows removed by the numeric validation sweep.
    pub rows_dropped_invalid_numeric: usize,
    /// Rows in the cleaned table.
    pub rows_after: usize,
}

impl CleaningStats {
    /// Total rows removed by all cleaning steps.
    pub fn rows_removed(&self) -> usize {
        self.rows_loaded.saturating_sub(self.rows_after)
    }

    /// Percentage of loaded rows that were removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_loaded == 0 {
            0.0
        } else {
            self.rows_removed() as f64 / self.rows_loaded as f64 * 100.0
        }
    }
}

// ============================================================================
// Summary tables
// ============================================================================

/// One row of a frequency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

/// Mean turnout of one state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateTurnout {
    pub state: String,
    pub mean_turnout: f64,
    /// Rows with a finite turnout that contributed to the mean.
    pub rows: usize,
}

/// Equal-width histogram with a count-scaled density curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
    /// `(x, estimated count)` points of the kernel density overlay.
    pub density: Vec<(f64, f64)>,
}

impl Histogram {
    /// Number of observations in the histogram.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Left edge of bin `i`.
    pub fn bin_start(&self, i: usize) -> f64 {
        self.min + self.bin_width * i as f64
    }
}

/// All summary tables produced by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub top_parties: Vec<CategoryCount>,
    pub top_states: Vec<StateTurnout>,
    pub gender: Vec<CategoryCount>,
    pub turnout_histogram: Option<Histogram>,
    pub margin_histogram: Option<Histogram>,
    /// Rows whose turnout is infinite or NaN (zero electors).
    pub non_finite_turnout: usize,
}

// ============================================================================
// Pipeline outputs
// ============================================================================

/// Files written by one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputFiles {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaned_csv: Option<PathBuf>,
    pub charts: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PathBuf>,
}

/// Result of a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Cleaned table with the derived `voter_turnout` and `winning_margin` columns.
    pub data: polars::prelude::DataFrame,
    pub stats: CleaningStats,
    pub summary: AnalysisSummary,
    pub cleaning_actions: Vec<String>,
    pub outputs: OutputFiles,
    pub duration_ms: u64,
}
