//! Configuration types for the election analysis pipeline.
//!
//! Use [`PipelineConfig::builder()`] for a validated configuration; the
//! defaults reproduce the fixed file names and chart parameters of the
//! reference analysis.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default file name of the cleaned table.
pub const DEFAULT_CLEANED_FILE_NAME: &str = "indian_election_cleaned.csv";

/// How the `winning_margin` column is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MarginStrategy {
    /// Absolute difference to the previous row of the same constituency,
    /// in input order. The first row of each constituency is 0.
    #[default]
    Sequential,
    /// Winner minus runner-up per contest (state, year, constituency),
    /// placed on the winner's row only.
    RunnerUp,
}

/// Configuration for the analysis pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use election_eda::config::{MarginStrategy, PipelineConfig};
///
/// let config = PipelineConfig::builder()
///     .output_dir("out")
///     .histogram_bins(30)
///     .margin_strategy(MarginStrategy::RunnerUp)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory receiving the cleaned CSV, charts and report.
    /// Default: "."
    pub output_dir: PathBuf,

    /// File name of the cleaned CSV inside `output_dir`.
    /// Default: "indian_election_cleaned.csv"
    pub cleaned_file_name: String,

    /// Number of equal-width bins for both histograms.
    /// Default: 20
    pub histogram_bins: usize,

    /// Number of parties shown in the winning parties chart.
    /// Default: 10
    pub top_parties: usize,

    /// Number of states shown in the turnout ranking chart.
    /// Default: 5
    pub top_states: usize,

    /// Chart width in pixels.
    /// Default: 1000
    pub chart_width: u32,

    /// Chart height in pixels.
    /// Default: 600
    pub chart_height: u32,

    /// How the winning margin column is computed.
    /// Default: Sequential
    pub margin_strategy: MarginStrategy,

    /// Remove rows whose vote or elector count is missing or negative after
    /// numeric coercion.
    /// Default: true
    pub drop_invalid_numeric: bool,

    /// Whether to draw the five PNG charts.
    /// Default: true
    pub render_charts: bool,

    /// Whether to write `analysis_report.json`.
    /// Default: false
    pub emit_report: bool,

    /// Whether to write anything to disk. When false, results stay in memory.
    /// Default: true
    pub save_to_disk: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            cleaned_file_name: DEFAULT_CLEANED_FILE_NAME.to_string(),
            histogram_bins: 20,
            top_parties: 10,
            top_states: 5,
            chart_width: 1000,
            chart_height: 600,
            margin_strategy: MarginStrategy::default(),
            drop_invalid_numeric: true,
            render_charts: true,
            emit_report: false,
            save_to_disk: true,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Full path of the cleaned CSV.
    pub fn cleaned_path(&self) -> PathBuf {
        self.output_dir.join(&self.cleaned_file_name)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "histogram_bins".to_string(),
            });
        }
        if self.top_parties == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "top_parties".to_string(),
            });
        }
        if self.top_states == 0 {
            return Err(ConfigValidationError::ZeroCount {
                field: "top_states".to_string(),
            });
        }
        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(ConfigValidationError::InvalidChartSize {
                width: self.chart_width,
                height: self.chart_height,
            });
        }
        if self.cleaned_file_name.trim().is_empty() {
            return Err(ConfigValidationError::EmptyFileName);
        }
        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': must be at least 1")]
    ZeroCount { field: String },

    #[error("Invalid chart size {width}x{height}: both dimensions must be positive")]
    InvalidChartSize { width: u32, height: u32 },

    #[error("Cleaned file name must not be empty")]
    EmptyFileName,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    output_dir: Option<PathBuf>,
    cleaned_file_name: Option<String>,
    histogram_bins: Option<usize>,
    top_parties: Option<usize>,
    top_states: Option<usize>,
    chart_width: Option<u32>,
    chart_height: Option<u32>,
    margin_strategy: Option<MarginStrategy>,
    drop_invalid_numeric: Option<bool>,
    render_charts: Option<bool>,
    emit_report: Option<bool>,
    save_to_disk: Option<bool>,
}

impl PipelineConfigBuilder {
    /// Set the output directory for the cleaned table, charts and report.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the cleaned CSV file name (with extension).
    pub fn cleaned_file_name(mut self, name: impl Into<String>) -> Self {
        self.cleaned_file_name = Some(name.into());
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Set how many parties the bar chart shows.
    pub fn top_parties(mut self, n: usize) -> Self {
        self.top_parties = Some(n);
        self
    }

    /// Set how many states the turnout ranking shows.
    pub fn top_states(mut self, n: usize) -> Self {
        self.top_states = Some(n);
        self
    }

    /// Set the chart size in pixels.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = Some(width);
        self.chart_height = Some(height);
        self
    }

    /// Set the winning margin strategy.
    pub fn margin_strategy(mut self, strategy: MarginStrategy) -> Self {
        self.margin_strategy = Some(strategy);
        self
    }

    /// Enable or disable the numeric validation sweep.
    pub fn drop_invalid_numeric(mut self, drop: bool) -> Self {
        self.drop_invalid_numeric = Some(drop);
        self
    }

    /// Enable or disable chart rendering.
    pub fn render_charts(mut self, render: bool) -> Self {
        self.render_charts = Some(render);
        self
    }

    /// Enable or disable the JSON run report.
    pub fn emit_report(mut self, emit: bool) -> Self {
        self.emit_report = Some(emit);
        self
    }

    /// Enable or disable all file output.
    pub fn save_to_disk(mut self, save: bool) -> Self {
        self.save_to_disk = Some(save);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            cleaned_file_name: self
                .cleaned_file_name
                .unwrap_or(defaults.cleaned_file_name),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            top_parties: self.top_parties.unwrap_or(defaults.top_parties),
            top_states: self.top_states.unwrap_or(defaults.top_states),
            chart_width: self.chart_width.unwrap_or(defaults.chart_width),
            chart_height: self.chart_height.unwrap_or(defaults.chart_height),
            margin_strategy: self.margin_strategy.unwrap_or_default(),
            drop_invalid_numeric: self
                .drop_invalid_numeric
                .unwrap_or(defaults.drop_invalid_numeric),
            render_charts: self.render_charts.unwrap_or(defaults.render_charts),
            emit_report: self.emit_report.unwrap_or(defaults.emit_report),
            save_to_disk: self.save_to_disk.unwrap_or(defaults.save_to_disk),
        };

        config.validate()?;
        Ok(config)
    }
}
