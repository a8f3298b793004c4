//! Derived columns and summary tables.
//!
//! [`Aggregator::derive_columns`] adds `voter_turnout` and `winning_margin` to
//! the cleaned table; [`Aggregator::summarize`] builds every table the
//! charts and the run report need.

mod counts;
mod distribution;
mod margin;
mod turnout;

pub use counts::value_counts;
pub use distribution::{DENSITY_GRID_POINTS, histogram, scott_bandwidth};
pub use margin::add_winning_margin;
pub use turnout::{add_voter_turnout, top_states_by_turnout, voter_turnout};

use crate::config::{MarginStrategy, PipelineConfig};
use crate::types::{AnalysisSummary, columns};
use crate::utils::float_column;
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Computes derived columns and summaries for a cleaned table.
#[derive(Debug, Clone)]
pub struct Aggregator {
    margin_strategy: MarginStrategy,
    top_parties: usize,
    top_states: usize,
    histogram_bins: usize,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

impl Aggregator {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            margin_strategy: config.margin_strategy,
            top_parties: config.top_parties,
            top_states: config.top_states,
            histogram_bins: config.histogram_bins,
        }
    }

    /// Add `voter_turnout` and `winning_margin`.
    pub fn derive_columns(&self, df: DataFrame) -> Result<DataFrame> {
        info!("Deriving voter turnout and winning margin...");
        let df = add_voter_turnout(df)?;
        let df = add_winning_margin(df, self.margin_strategy)?;
        debug!("Derived columns added using {:?} margins", self.margin_strategy);
        Ok(df)
    }

    /// Build all summary tables from a table that has the derived columns.
    pub fn summarize(&self, df: &DataFrame) -> Result<AnalysisSummary> {
        info!("Building summary tables...");

        let turnout = non_null_values(df, columns::VOTER_TURNOUT)?;
        let non_finite_turnout = turnout.iter().filter(|v| !v.is_finite()).count();
        if non_finite_turnout > 0 {
            warn!(
                "{} rows have an undefined turnout (zero electors) and are left out of turnout summaries",
                non_finite_turnout
            );
        }

        let margins = non_null_values(df, columns::WINNING_MARGIN)?;

        let summary = AnalysisSummary {
            top_parties: value_counts(df, columns::PARTYNAME, Some(self.top_parties))?,
            top_states: top_states_by_turnout(df, self.top_states)?,
            gender: value_counts(df, columns::CAND_SEX, None)?,
            turnout_histogram: histogram(&turnout, self.histogram_bins),
            margin_histogram: histogram(&margins, self.histogram_bins),
            non_finite_turnout,
        };

        debug!(
            "Summary: {} parties, {} states, {} gender groups",
            summary.top_parties.len(),
            summary.top_states.len(),
            summary.gender.len()
        );
        Ok(summary)
    }
}

/// Non-null values of a float column. Non-finite values are kept.
fn non_null_values(df: &DataFrame, column: &str) -> Result<Vec<f64>> {
    Ok(float_column(df, column)?.into_iter().flatten().collect())
}
