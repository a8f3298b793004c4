//! The analysis pipeline and its builder.
//!
//! A run goes loader → cleaner → aggregator → outputs. Each stage reports
//! progress and maps its failures into a typed [`EdaError`].

use crate::aggregator::Aggregator;
use crate::cleaner::DataCleaner;
use crate::config::PipelineConfig;
use crate::error::{EdaError, Result};
use crate::loader::{load_election_csv, normalize_missing_markers, validate_columns};
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::reporting::{ChartRenderer, REPORT_FILE_NAME, ReportGenerator};
use crate::types::{OutputFiles, PipelineResult};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Label used in the run report when the table did not come from a file.
const IN_MEMORY_INPUT: &str = "<in-memory>";

/// The election analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use election_eda::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::builder().output_dir("out").build()?)
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .build()?
///     .run("indian_election_dataset.csv")?;
///
/// println!("{} rows kept", result.stats.rows_after);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    cleaner: DataCleaner,
    aggregator: Aggregator,
    reporter: ReportGenerator,
    charts: ChartRenderer,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load the CSV at `path` and run every stage on it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let path = path.as_ref();
        let start_time = Instant::now();

        let outcome = self.load(path).and_then(|df| {
            self.process_internal(df, &path.display().to_string(), start_time)
        });
        self.finish(outcome)
    }

    /// Run every stage on a table that is already in memory.
    ///
    /// The table must contain the required columns as text; it goes through
    /// the same validation as a loaded file.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();

        let outcome = self.prepare(df).and_then(|df| {
            self.process_internal(df, IN_MEMORY_INPUT, start_time)
        });
        self.finish(outcome)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn finish(&self, outcome: Result<PipelineResult>) -> Result<PipelineResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn load(&self, path: &Path) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Loading {}...", path.display()),
        ));
        let df = load_election_csv(path)?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Loaded {} rows", df.height()),
        ));
        Ok(df)
    }

    fn prepare(&self, df: DataFrame) -> Result<DataFrame> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            "Validating columns...",
        ));
        let df = validate_columns(df)?;
        let (df, markers) = normalize_missing_markers(df)?;
        debug!("Converted {} missing-value markers to null", markers);
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            1.0,
            format!("Validated {} rows", df.height()),
        ));
        Ok(df)
    }

    fn process_internal(
        &self,
        df: DataFrame,
        input_label: &str,
        start_time: Instant,
    ) -> Result<PipelineResult> {
        info!("Starting analysis pipeline on {} rows...", df.height());

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            0.0,
            "Cleaning data...",
        ));
        info!("Step 1: Cleaning data...");
        let cleaned = self
            .cleaner
            .clean(df)
            .map_err(|e| EdaError::CleaningFailed(format!("{:#}", e)))?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Cleaning,
            1.0,
            format!("{} rows remain after cleaning", cleaned.stats.rows_after),
        ));

        // Step 2: Aggregation
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregating,
            0.0,
            "Deriving turnout and margins...",
        ));
        info!("Step 2: Aggregating...");
        let data = self
            .aggregator
            .derive_columns(cleaned.data)
            .map_err(|e| EdaError::AggregationFailed(format!("{:#}", e)))?;
        let summary = self
            .aggregator
            .summarize(&data)
            .map_err(|e| EdaError::AggregationFailed(format!("{:#}", e)))?;
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Aggregating,
            1.0,
            "Summary tables ready",
        ));

        // Step 3: Outputs
        let mut outputs = OutputFiles::default();
        if self.config.save_to_disk {
            info!("Step 3: Writing outputs...");
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Reporting,
                0.0,
                "Writing cleaned dataset...",
            ));
            let cleaned_path = self
                .reporter
                .write_cleaned_csv(&data)
                .map_err(|e| EdaError::ReportGenerationFailed(format!("{:#}", e)))?;
            outputs.cleaned_csv = Some(cleaned_path);

            if self.config.render_charts {
                self.report_progress(ProgressUpdate::new(
                    PipelineStage::Reporting,
                    0.3,
                    "Rendering charts...",
                ));
                outputs.charts = self
                    .charts
                    .render_all(&summary, self.reporter.output_dir())?;
            } else {
                debug!("Chart rendering disabled");
            }

            if self.config.emit_report {
                outputs.report = Some(self.reporter.output_dir().join(REPORT_FILE_NAME));
            }
        } else {
            info!("Step 3: Skipping outputs (save_to_disk is off)");
        }

        let mut result = PipelineResult {
            data,
            stats: cleaned.stats,
            summary,
            cleaning_actions: cleaned.actions,
            outputs,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        if result.outputs.report.is_some() {
            self.report_progress(ProgressUpdate::new(
                PipelineStage::Reporting,
                0.9,
                "Writing run report...",
            ));
            let report = ReportGenerator::build_report(input_label, &self.config, &result);
            let written = self
                .reporter
                .write_report(&report)
                .map_err(|e| EdaError::ReportGenerationFailed(format!("{:#}", e)))?;
            result.outputs.report = Some(written);
        }

        result.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Pipeline finished in {} ms: {} -> {} rows",
            result.duration_ms, result.stats.rows_loaded, result.stats.rows_after
        );
        Ok(result)
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// For anything beyond printing, use
    /// [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, crate::config::ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.drop_invalid_numeric),
            aggregator: Aggregator::from_config(&config),
            reporter: ReportGenerator::from_config(&config),
            charts: ChartRenderer::new(config.chart_width, config.chart_height),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}
