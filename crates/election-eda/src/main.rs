//! CLI entry point for the election analysis pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use election_eda::{MarginStrategy, Pipeline, PipelineConfig, PipelineResult, ProgressUpdate};
use tracing::{error, info};

/// CLI-compatible margin strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMarginStrategy {
    /// Vote difference to the previous row of the same constituency
    Sequential,
    /// Winner minus runner-up per contest
    RunnerUp,
}

impl From<CliMarginStrategy> for MarginStrategy {
    fn from(cli: CliMarginStrategy) -> Self {
        match cli {
            CliMarginStrategy::Sequential => MarginStrategy::Sequential,
            CliMarginStrategy::RunnerUp => MarginStrategy::RunnerUp,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Exploratory analysis of Indian general election results",
    long_about = "Cleans a constituency-level election CSV, derives turnout and \
                  winning margins, and renders five summary charts.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: read ./indian_election_dataset.csv, write into .\n  \
                  election-eda\n\n  \
                  # Custom input and output directory\n  \
                  election-eda -i data/elections.csv -o results/\n\n  \
                  # Electoral margins and a JSON run report\n  \
                  election-eda --margin runner-up --emit-report"
)]
struct Args {
    /// Path to the election CSV
    #[arg(short, long, default_value = "indian_election_dataset.csv")]
    input: String,

    /// Output directory for the cleaned CSV, charts and report
    #[arg(short, long, default_value = ".")]
    output: String,

    /// File name of the cleaned CSV
    #[arg(long, default_value = election_eda::config::DEFAULT_CLEANED_FILE_NAME)]
    cleaned_name: String,

    /// Number of histogram bins
    #[arg(long, default_value = "20")]
    bins: usize,

    /// Number of parties in the winning parties chart
    #[arg(long, default_value = "10")]
    top_parties: usize,

    /// Number of states in the turnout ranking chart
    #[arg(long, default_value = "5")]
    top_states: usize,

    /// How the winning margin column is computed
    #[arg(long, value_enum, default_value = "sequential")]
    margin: CliMarginStrategy,

    /// Keep rows whose vote or elector count is missing or negative
    #[arg(long)]
    keep_invalid_numeric: bool,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Write analysis_report.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the summary)
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let config = PipelineConfig::builder()
        .output_dir(&args.output)
        .cleaned_file_name(&args.cleaned_name)
        .histogram_bins(args.bins)
        .top_parties(args.top_parties)
        .top_states(args.top_states)
        .margin_strategy(args.margin.into())
        .drop_invalid_numeric(!args.keep_invalid_numeric)
        .render_charts(!args.no_charts)
        .emit_report(args.emit_report)
        .build()?;

    let mut builder = Pipeline::builder().config(config);
    if !args.quiet {
        builder = builder.on_progress(|update| info!("{}", progress_line(&update)));
    }
    let pipeline = builder.build()?;

    info!("{}", "=".repeat(80));
    info!("Starting election analysis pipeline...");
    info!("{}", "=".repeat(80));

    match pipeline.run(&args.input) {
        Ok(result) => {
            print_summary(&result, &args);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed [{}]: {}", e.error_code(), e);
            Err(anyhow!("Pipeline failed: {}", e))
        }
    }
}

/// One log line per progress event, e.g. `[15%] Cleaning Data: Cleaning data...`.
fn progress_line(update: &ProgressUpdate) -> String {
    format!(
        "[{:.0}%] {}: {}",
        update.progress * 100.0,
        update.stage.display_name(),
        update.message
    )
}

/// Print the run summary.
///
/// Uses `println!` so the summary is shown at every log level.
fn print_summary(result: &PipelineResult, args: &Args) {
    let stats = &result.stats;
    let summary = &result.summary;

    println!("\n{}", "=".repeat(80));
    println!("ELECTION ANALYSIS COMPLETE");
    println!("{}\n", "=".repeat(80));

    println!("INPUT");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!(
        "  Rows: {} -> {} ({:.1}% removed)",
        stats.rows_loaded,
        stats.rows_after,
        stats.rows_removed_percentage()
    );
    println!();

    println!("CLEANING");
    println!("{}", "-".repeat(40));
    for action in &result.cleaning_actions {
        println!("  - {}", action);
    }
    println!();

    println!("TOP WINNING PARTIES");
    println!("{}", "-".repeat(40));
    for party in &summary.top_parties {
        println!("  {:<50} {:>8}", truncate_str(&party.label, 49), party.count);
    }
    println!();

    println!("TOP STATES BY AVERAGE TURNOUT");
    println!("{}", "-".repeat(40));
    for state in &summary.top_states {
        println!(
            "  {:<50} {:>7.2}%",
            truncate_str(&state.state, 49),
            state.mean_turnout
        );
    }
    println!();

    println!("CANDIDATES BY SEX");
    println!("{}", "-".repeat(40));
    for group in &summary.gender {
        println!("  {:<50} {:>8}", group.label, group.count);
    }
    if summary.non_finite_turnout > 0 {
        println!(
            "\n  {} rows with zero electors were left out of turnout figures",
            summary.non_finite_turnout
        );
    }
    println!();

    println!("OUTPUTS");
    println!("{}", "-".repeat(40));
    if let Some(path) = &result.outputs.cleaned_csv {
        println!("  Cleaned dataset: {}", path.display());
    }
    for chart in &result.outputs.charts {
        println!("  Chart: {}", chart.display());
    }
    if let Some(path) = &result.outputs.report {
        println!("  Report: {}", path.display());
    }
    println!("\n  Completed in {} ms", result.duration_ms);
    println!("{}", "=".repeat(80));
}

/// Truncate a string to `max` characters, marking the cut with "...".
fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use election_eda::PipelineStage;

    #[test]
    fn test_progress_line() {
        let update = ProgressUpdate::new(PipelineStage::Cleaning, 0.0, "Cleaning data...");
        assert_eq!(progress_line(&update), "[15%] Cleaning Data: Cleaning data...");
        assert_eq!(
            progress_line(&ProgressUpdate::complete("Done")),
            "[100%] Complete: Done"
        );
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("Goa", 10), "Goa");
        assert_eq!(truncate_str("Communist Party Of India", 10), "Communi...");
    }

    #[test]
    fn test_quiet_flag() {
        let args = Args::parse_from(["election-eda", "-q", "--margin", "runner-up"]);
        assert!(args.quiet);
        assert!(matches!(
            MarginStrategy::from(args.margin),
            MarginStrategy::RunnerUp
        ));
    }
}
