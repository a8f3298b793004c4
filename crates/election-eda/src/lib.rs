//! Indian Election Analysis Library
//!
//! Cleaning, aggregation and chart rendering for constituency-level Indian
//! general election results, built on Polars and plotters.
//!
//! # Overview
//!
//! A run is a fixed four-stage pipeline:
//!
//! - **Loading**: read the CSV with every column as text and check that the
//!   eleven required columns are present
//! - **Cleaning**: fill, drop, deduplicate, normalize names and sex codes,
//!   coerce vote and elector counts
//! - **Aggregating**: derive `voter_turnout` and `winning_margin`, build the
//!   party, state, gender and distribution tables
//! - **Reporting**: write the cleaned CSV, five PNG charts and an optional
//!   JSON run report
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use election_eda::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .output_dir("out")
//!     .top_parties(10)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run("indian_election_dataset.csv")?;
//!
//! for party in &result.summary.top_parties {
//!     println!("{}: {}", party.label, party.count);
//! }
//! ```
//!
//! # Winning margin
//!
//! The default [`MarginStrategy::Sequential`] keeps the historical
//! definition: the absolute vote difference to the previous row of the same
//! constituency. [`MarginStrategy::RunnerUp`] gives the electoral margin of
//! each contest's winner instead.

pub mod aggregator;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use aggregator::Aggregator;
pub use cleaner::{CleaningOutcome, DataCleaner};
pub use config::{ConfigValidationError, MarginStrategy, PipelineConfig, PipelineConfigBuilder};
pub use error::{EdaError, Result as EdaResult, ResultExt};
pub use loader::{load_election_csv, read_election_csv};
pub use pipeline::{
    ClosureProgressReporter, Pipeline, PipelineBuilder, PipelineStage, ProgressReporter,
    ProgressUpdate,
};
pub use reporting::{AnalysisReport, ChartRenderer, ReportGenerator};
pub use types::{
    AnalysisSummary, CategoryCount, CleaningStats, Histogram, OutputFiles, PipelineResult,
    StateTurnout,
};
