use crate::config::PipelineConfig;
use crate::types::{AnalysisSummary, CleaningStats, OutputFiles, PipelineResult, columns};
use anyhow::Result;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const REPORT_FILE_NAME: &str = "analysis_report.json";

/// Machine-readable record of one pipeline run.
///
/// Written as `analysis_report.json` when `--emit-report` is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Local time the report was built
    pub generated_at: String,
    pub input_file: String,
    pub config: PipelineConfig,
    pub cleaning: CleaningStats,
    pub cleaning_actions: Vec<String>,
    pub summary: AnalysisSummary,
    pub outputs: OutputFiles,
    pub duration_ms: u64,
}

/// Writes the cleaned table and the run report.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    cleaned_file_name: String,
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>, cleaned_file_name: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            cleaned_file_name: cleaned_file_name.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.output_dir, &config.cleaned_file_name)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save the eleven source columns as CSV, header first.
    ///
    /// Derived columns are left out. An existing file is overwritten and the
    /// output is identical for identical input.
    pub fn write_cleaned_csv(&self, df: &DataFrame) -> Result<PathBuf> {
        let mut cleaned = df.select(columns::REQUIRED)?;

        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(&self.cleaned_file_name);
        let mut file = File::create(&output_path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut cleaned)?;

        info!(
            "Cleaned dataset saved: {} ({} rows)",
            output_path.display(),
            cleaned.height()
        );
        Ok(output_path)
    }

    /// Assemble the report for a finished run.
    pub fn build_report(
        input_file: &str,
        config: &PipelineConfig,
        result: &PipelineResult,
    ) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input_file: input_file.to_string(),
            config: config.clone(),
            cleaning: result.stats.clone(),
            cleaning_actions: result.cleaning_actions.clone(),
            summary: result.summary.clone(),
            outputs: result.outputs.clone(),
            duration_ms: result.duration_ms,
        }
    }

    pub fn write_report(&self, report: &AnalysisReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let json = serde_json::to_string_pretty(report)?;

        let mut file = File::create(&report_path)?;
        file.write_all(json.as_bytes())?;
        debug!("Report is {} bytes", json.len());

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }
}
