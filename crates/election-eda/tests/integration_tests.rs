//! Integration tests for the election analysis pipeline.
//!
//! These tests run the whole pipeline on a small fixture that exercises every
//! cleaning rule: missing labels, missing values, duplicates, underscored
//! names, mixed sex codes, unparseable and negative counts.

use election_eda::reporting::{
    CHART_FILES, REPORT_FILE_NAME, TOP_STATES_CHART, VOTER_TURNOUT_CHART, font_available,
};
use election_eda::types::columns;
use election_eda::utils::{float_column, string_column, total_null_count};
use election_eda::{
    EdaError, MarginStrategy, Pipeline, PipelineConfig, PipelineResult, PipelineStage,
    load_election_csv,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/election_sample.csv")
}

fn in_memory_config() -> PipelineConfig {
    PipelineConfig::builder().save_to_disk(false).build().unwrap()
}

fn run_with(config: PipelineConfig) -> PipelineResult {
    Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture_path())
        .unwrap()
}

fn run_to_dir(dir: &Path) -> PipelineResult {
    run_with(
        PipelineConfig::builder()
            .output_dir(dir)
            .render_charts(false)
            .build()
            .unwrap(),
    )
}

fn strings(df: &DataFrame, name: &str) -> Vec<String> {
    string_column(df, name)
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

fn floats(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    float_column(df, name).unwrap().into_iter().collect()
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_cleaning_stats_on_fixture() {
    let result = run_with(in_memory_config());
    let stats = &result.stats;

    assert_eq!(stats.rows_loaded, 11);
    assert_eq!(stats.nulls_filled.get("pc_type"), Some(&1));
    assert_eq!(stats.nulls_filled.get("cand_sex"), Some(&1));
    assert_eq!(stats.rows_dropped_null, 1);
    assert_eq!(stats.duplicates_removed, 1);
    assert_eq!(stats.values_coerced_to_null.get("totvotpoll"), Some(&1));
    assert_eq!(stats.rows_dropped_invalid_numeric, 2);
    assert_eq!(stats.rows_after, 7);
    assert_eq!(result.data.height(), 7);
}

#[test]
fn test_cleaned_table_has_no_nulls_or_duplicates() {
    let result = run_with(in_memory_config());
    let df = result.data.select(columns::REQUIRED).unwrap();

    assert_eq!(total_null_count(&df), 0);

    let unique = df
        .unique_stable(None, UniqueKeepStrategy::First, None)
        .unwrap();
    assert_eq!(unique.height(), df.height());
}

#[test]
fn test_sex_codes_are_canonical() {
    let result = run_with(in_memory_config());
    assert_eq!(
        strings(&result.data, columns::CAND_SEX),
        vec!["Male", "Male", "Female", "Male", "Unknown", "Female", "Unknown"]
    );
}

#[test]
fn test_names_are_normalized() {
    let result = run_with(in_memory_config());

    let parties = strings(&result.data, columns::PARTYNAME);
    assert!(parties.iter().all(|p| !p.contains('_')));
    assert_eq!(parties[0], "Indian National Congress");
    assert_eq!(parties[3], "Indian National Congress");
    assert_eq!(parties[5], "Communist Party Of India (Marxist)");

    // abbreviations and candidate names are left alone
    assert_eq!(strings(&result.data, columns::PARTYABBRE)[0], "INC");
    assert_eq!(
        strings(&result.data, columns::CAND_NAME)[3],
        "Kishore Chandra Deo, V."
    );
}

#[test]
fn test_missing_labels_filled_with_unknown() {
    let result = run_with(in_memory_config());
    assert_eq!(strings(&result.data, columns::PC_TYPE)[4], "Unknown");
}

#[test]
fn test_keep_invalid_numeric() {
    let config = PipelineConfig::builder()
        .save_to_disk(false)
        .drop_invalid_numeric(false)
        .build()
        .unwrap();
    let result = run_with(config);

    assert_eq!(result.stats.rows_after, 9);
    assert_eq!(result.stats.rows_dropped_invalid_numeric, 0);

    let votes = floats(&result.data, columns::TOTVOTPOLL);
    assert_eq!(votes[6], None);
    assert_eq!(votes[8], Some(-5.0));

    let turnout = floats(&result.data, columns::VOTER_TURNOUT);
    assert_eq!(turnout[6], None);
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn test_voter_turnout() {
    let result = run_with(in_memory_config());
    assert_eq!(
        floats(&result.data, columns::VOTER_TURNOUT),
        vec![
            Some(50.0),
            Some(30.0),
            Some(10.0),
            Some(62.5),
            Some(37.5),
            Some(80.0),
            Some(90.0)
        ]
    );
}

#[test]
fn test_sequential_winning_margin() {
    let result = run_with(in_memory_config());
    assert_eq!(
        floats(&result.data, columns::WINNING_MARGIN),
        vec![
            Some(0.0),
            Some(400.0),
            Some(400.0),
            Some(0.0),
            Some(2000.0),
            Some(0.0),
            Some(0.0)
        ]
    );
}

#[test]
fn test_runner_up_winning_margin() {
    let config = PipelineConfig::builder()
        .save_to_disk(false)
        .margin_strategy(MarginStrategy::RunnerUp)
        .build()
        .unwrap();
    let result = run_with(config);

    assert_eq!(
        floats(&result.data, columns::WINNING_MARGIN),
        vec![
            Some(400.0),
            None,
            None,
            Some(2000.0),
            None,
            Some(4000.0),
            Some(900.0)
        ]
    );
    assert_eq!(result.summary.margin_histogram.unwrap().total(), 4);
}

#[test]
fn test_top_parties() {
    let result = run_with(in_memory_config());
    let parties = &result.summary.top_parties;

    assert!(parties.len() <= 10);
    assert!(parties.windows(2).all(|w| w[0].count >= w[1].count));

    let labels: Vec<&str> = parties.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Indian National Congress",
            "Bharatiya Lok Dal",
            "Independent",
            "Communist Party Of India (Marxist)",
            "Maharashtrawadi Gomantak"
        ]
    );
    assert_eq!(parties[0].count, 2);
}

#[test]
fn test_top_states_by_turnout() {
    let result = run_with(in_memory_config());
    let states: Vec<(&str, f64)> = result
        .summary
        .top_states
        .iter()
        .map(|s| (s.state.as_str(), s.mean_turnout))
        .collect();

    assert_eq!(
        states,
        vec![("Goa", 90.0), ("Kerala", 80.0), ("Andhra Pradesh", 38.0)]
    );
}

#[test]
fn test_gender_counts() {
    let result = run_with(in_memory_config());
    let gender: Vec<(&str, usize)> = result
        .summary
        .gender
        .iter()
        .map(|g| (g.label.as_str(), g.count))
        .collect();

    assert_eq!(gender, vec![("Male", 3), ("Female", 2), ("Unknown", 2)]);
}

#[test]
fn test_histograms_cover_all_rows() {
    let result = run_with(in_memory_config());
    let turnout = result.summary.turnout_histogram.as_ref().unwrap();
    let margin = result.summary.margin_histogram.as_ref().unwrap();

    assert_eq!(turnout.counts.len(), 20);
    assert_eq!(turnout.total(), 7);
    assert_eq!(turnout.min, 10.0);
    assert_eq!(turnout.max, 90.0);
    assert_eq!(margin.total(), 7);
}

// ============================================================================
// Outputs
// ============================================================================

#[test]
fn test_cleaned_csv_written() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_to_dir(dir.path());

    let path = result.outputs.cleaned_csv.clone().unwrap();
    assert_eq!(path, dir.path().join("indian_election_cleaned.csv"));
    assert!(result.outputs.charts.is_empty());
    assert!(result.outputs.report.is_none());

    // the written file loads back with the same shape and no derived columns
    let reloaded = load_election_csv(&path).unwrap();
    assert_eq!(reloaded.height(), 7);
    let header = std::fs::read_to_string(&path)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, columns::REQUIRED.join(","));
}

#[test]
fn test_cleaned_csv_is_deterministic() {
    let first_dir = tempfile::tempdir().unwrap();
    let second_dir = tempfile::tempdir().unwrap();

    let first = run_to_dir(first_dir.path());
    let second = run_to_dir(second_dir.path());
    // rerun into the same directory overwrites
    let again = run_to_dir(first_dir.path());

    let read = |r: &PipelineResult| std::fs::read(r.outputs.cleaned_csv.as_ref().unwrap()).unwrap();
    assert_eq!(read(&first), read(&second));
    assert_eq!(read(&first), read(&again));
}

#[test]
fn test_emit_report() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_with(
        PipelineConfig::builder()
            .output_dir(dir.path())
            .render_charts(false)
            .emit_report(true)
            .build()
            .unwrap(),
    );

    let path = result.outputs.report.clone().unwrap();
    assert_eq!(path, dir.path().join(REPORT_FILE_NAME));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["cleaning"]["rows_after"], 7);
    assert_eq!(report["config"]["margin_strategy"], "sequential");
    assert_eq!(
        report["summary"]["top_parties"][0]["label"],
        "Indian National Congress"
    );
    assert!(report["generated_at"].as_str().is_some());
}

#[test]
fn test_charts_rendered() {
    if !font_available() {
        eprintln!("skipping: no chart font");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let result = run_with(PipelineConfig::builder().output_dir(dir.path()).build().unwrap());

    assert_eq!(result.outputs.charts.len(), CHART_FILES.len());
    for name in CHART_FILES {
        let path = dir.path().join(name);
        assert!(path.exists(), "missing chart {}", name);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}

#[test]
fn test_rerun_replaces_every_chart() {
    if !font_available() {
        eprintln!("skipping: no chart font");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder().output_dir(dir.path()).build().unwrap();
    let pipeline = Pipeline::builder().config(config).build().unwrap();

    pipeline.run(fixture_path()).unwrap();
    let first_turnout = std::fs::read(dir.path().join(VOTER_TURNOUT_CHART)).unwrap();
    let first_states = std::fs::read(dir.path().join(TOP_STATES_CHART)).unwrap();

    // Zero electors leaves no finite turnout, so both turnout charts have no data.
    let input = dir.path().join("zero_electors.csv");
    std::fs::write(
        &input,
        "st_name,year,pc_no,pc_name,pc_type,cand_name,cand_sex,partyname,partyabbre,totvotpoll,electors\n\
         Goa,1977,1,Panaji,GEN,A,M,Inc,INC,10,0\n",
    )
    .unwrap();
    let result = pipeline.run(&input).unwrap();

    assert!(result.summary.turnout_histogram.is_none());
    assert!(result.summary.top_states.is_empty());
    assert_eq!(result.outputs.charts.len(), CHART_FILES.len());
    assert_ne!(
        std::fs::read(dir.path().join(VOTER_TURNOUT_CHART)).unwrap(),
        first_turnout
    );
    assert_ne!(
        std::fs::read(dir.path().join(TOP_STATES_CHART)).unwrap(),
        first_states
    );
}

// ============================================================================
// Failures and progress
// ============================================================================

#[test]
fn test_missing_required_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_electors.csv");
    std::fs::write(
        &path,
        "st_name,year,pc_no,pc_name,pc_type,cand_name,cand_sex,partyname,partyabbre,totvotpoll\n\
         Goa,1977,1,Panaji,GEN,A,M,Inc,INC,10\n",
    )
    .unwrap();

    let err = Pipeline::builder()
        .config(in_memory_config())
        .build()
        .unwrap()
        .run(&path)
        .unwrap_err();

    assert!(matches!(err, EdaError::ColumnNotFound(ref c) if c == "electors"));
    assert!(err.is_input_error());
}

#[test]
fn test_missing_input_file() {
    let err = Pipeline::builder()
        .config(in_memory_config())
        .build()
        .unwrap()
        .run("tests/fixtures/does_not_exist.csv")
        .unwrap_err();

    assert_eq!(err.error_code(), "IO_ERROR");
    assert!(!err.is_input_error());
}

#[test]
fn test_progress_reaches_complete() {
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = stages.clone();

    let dir = tempfile::tempdir().unwrap();
    Pipeline::builder()
        .config(
            PipelineConfig::builder()
                .output_dir(dir.path())
                .render_charts(false)
                .build()
                .unwrap(),
        )
        .on_progress(move |update| {
            stages_clone.lock().unwrap().push(update.stage);
        })
        .build()
        .unwrap()
        .run(fixture_path())
        .unwrap();

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&PipelineStage::Loading));
    assert!(stages.contains(&PipelineStage::Reporting));
    assert_eq!(stages.last(), Some(&PipelineStage::Complete));
}
