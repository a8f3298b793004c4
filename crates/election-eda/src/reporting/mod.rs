//! Output generation.
//!
//! [`ReportGenerator`] writes the cleaned CSV and the optional JSON run
//! report; [`ChartRenderer`] draws the five PNG charts.
//!
//! # Example
//!
//! ```rust,ignore
//! use election_eda::reporting::{ChartRenderer, ReportGenerator};
//!
//! let generator = ReportGenerator::new("out", "indian_election_cleaned.csv");
//! generator.write_cleaned_csv(&result.data)?;
//!
//! let charts = ChartRenderer::new(1000, 600).render_all(&result.summary, generator.output_dir())?;
//! ```

pub mod charts;
mod generator;

pub use charts::{
    ChartRenderer, GENDER_CHART, TOP_STATES_CHART, VOTER_TURNOUT_CHART, WINNING_MARGIN_CHART,
    WINNING_PARTIES_CHART, font_available,
};
pub use generator::{AnalysisReport, REPORT_FILE_NAME, ReportGenerator};

/// File names of every chart, in rendering order.
pub const CHART_FILES: [&str; 5] = [
    VOTER_TURNOUT_CHART,
    WINNING_PARTIES_CHART,
    TOP_STATES_CHART,
    GENDER_CHART,
    WINNING_MARGIN_CHART,
];
