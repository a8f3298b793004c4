//! Loading the election record table from CSV.
//!
//! Every column is read as text. Coercion is the cleaner's job, so the reader
//! never guesses a type and never fails on a stray non-numeric vote count.

use crate::error::{EdaError, Result, ResultExt};
use crate::types::columns;
use crate::utils::is_missing_marker;
use polars::io::csv::read::{CsvEncoding, CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read options shared by the file and in-memory readers.
fn read_options(encoding: CsvEncoding) -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        // Zero inference rows reads every column as String.
        .with_infer_schema_length(Some(0))
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_encoding(encoding),
        )
}

/// Load and validate the election CSV at `path`.
///
/// Falls back to lossy UTF-8 decoding when the file contains invalid bytes.
/// The returned frame holds exactly the required columns, in canonical order,
/// with missing markers already converted to nulls.
pub fn load_election_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(EdaError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Input file not found: {}", path.display()),
        )));
    }

    info!("Loading dataset from: {}", path.display());

    let df = match read_options(CsvEncoding::Utf8)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Failed to open {}", path.display()))?
        .finish()
    {
        Ok(df) => df,
        Err(e) => {
            debug!("Strict UTF-8 loading failed: {}", e);
            warn!("Retrying {} with lossy UTF-8 decoding", path.display());
            read_options(CsvEncoding::LossyUtf8)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .context(format!("Failed to open {}", path.display()))?
                .finish()
                .map_err(|e| EdaError::LoadFailed(format!("{}: {}", path.display(), e)))?
        }
    };

    prepare_loaded(df)
}

/// Load the election table from CSV bytes already in memory.
pub fn read_election_csv(bytes: impl Into<Vec<u8>>) -> Result<DataFrame> {
    let df = read_options(CsvEncoding::Utf8)
        .into_reader_with_file_handle(Cursor::new(bytes.into()))
        .finish()
        .map_err(|e| EdaError::LoadFailed(e.to_string()))?;
    prepare_loaded(df)
}

fn prepare_loaded(df: DataFrame) -> Result<DataFrame> {
    let df = validate_columns(df)?;
    let (df, markers) = normalize_missing_markers(df)?;
    if markers > 0 {
        debug!("Converted {} missing-value markers to null", markers);
    }
    info!("Dataset loaded: {} rows x {} columns", df.height(), df.width());
    Ok(df)
}

/// Check that every required column is present.
///
/// Extra columns are dropped and the required ones are returned in canonical
/// order.
pub fn validate_columns(df: DataFrame) -> Result<DataFrame> {
    let present: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for required in columns::REQUIRED {
        if !present.iter().any(|name| name == required) {
            return Err(EdaError::ColumnNotFound(required.to_string()));
        }
    }

    let extra: Vec<&String> = present
        .iter()
        .filter(|name| !columns::REQUIRED.contains(&name.as_str()))
        .collect();
    if !extra.is_empty() {
        debug!("Ignoring extra columns: {:?}", extra);
    }

    Ok(df.select(columns::REQUIRED)?)
}

/// Replace missing-value markers in string columns with nulls.
///
/// Returns the frame and the number of cells replaced.
pub fn normalize_missing_markers(df: DataFrame) -> Result<(DataFrame, usize)> {
    let mut df = df;
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut total = 0;
    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let str_series = series.str()?;
        let mut replaced = 0;
        let values: Vec<Option<&str>> = str_series
            .into_iter()
            .map(|opt| match opt {
                Some(v) if is_missing_marker(v) => {
                    replaced += 1;
                    None
                }
                other => other,
            })
            .collect();

        if replaced > 0 {
            let cleaned = Series::new(col_name.as_str().into(), values);
            df.replace(col_name, cleaned)?;
            total += replaced;
        }
    }

    Ok((df, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::string_column;

    const HEADER: &str =
        "st_name,year,pc_no,pc_name,pc_type,cand_name,cand_sex,partyname,partyabbre,totvotpoll,electors";

    #[test]
    fn test_read_all_columns_as_text() {
        let csv = format!(
            "{HEADER}\nKerala,1977,1,Kasaragod,GEN,A,M,CPM,CPM,1000,2000\n"
        );
        let df = read_election_csv(csv).unwrap();
        assert_eq!(df.shape(), (1, 11));
        assert_eq!(df.column("totvotpoll").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("year").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_markers_become_null() {
        let csv = format!(
            "{HEADER}\nKerala,1977,1,Kasaragod,,A,NaN,CPM,CPM,N/A,2000\nKerala,1977,1,Kasaragod,GEN,B,Unknown,INC,INC,10,2000\n"
        );
        let df = read_election_csv(csv).unwrap();
        assert_eq!(df.column("pc_type").unwrap().null_count(), 1);
        assert_eq!(df.column("cand_sex").unwrap().null_count(), 1);
        assert_eq!(df.column("totvotpoll").unwrap().null_count(), 1);
        // "Unknown" is a label, not a missing value
        let sex = string_column(&df, "cand_sex").unwrap().get(1);
        assert_eq!(sex, Some("Unknown"));
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "st_name,year\nKerala,1977\n";
        let err = read_election_csv(csv).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_NOT_FOUND");
        assert!(err.to_string().contains("pc_no"));
    }

    #[test]
    fn test_extra_columns_dropped_and_reordered() {
        let csv = "electors,notes,st_name,year,pc_no,pc_name,pc_type,cand_name,cand_sex,partyname,partyabbre,totvotpoll\n\
                   2000,x,Kerala,1977,1,Kasaragod,GEN,A,M,CPM,CPM,1000\n";
        let df = read_election_csv(csv).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, columns::REQUIRED.to_vec());
    }

    #[test]
    fn test_missing_file() {
        let err = load_election_csv("does/not/exist.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }
}
