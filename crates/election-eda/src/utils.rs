//! Shared helpers for the election analysis pipeline.
//!
//! Column accessors, text normalization and numeric parsing used by the
//! loader, cleaner and aggregator.

use polars::prelude::*;

// =============================================================================
// Column Accessors
// =============================================================================

/// Borrow a column as a string array.
pub fn string_column<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a StringChunked> {
    df.column(name)?.as_materialized_series().str()
}

/// Borrow a column as a `Float64` array.
pub fn float_column<'a>(df: &'a DataFrame, name: &str) -> PolarsResult<&'a Float64Chunked> {
    df.column(name)?.as_materialized_series().f64()
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Total number of null cells in the frame.
pub fn total_null_count(df: &DataFrame) -> usize {
    df.get_columns().iter().map(|col| col.null_count()).sum()
}

// =============================================================================
// Missing Value Markers
// =============================================================================

/// Tokens read as missing, matched exactly (case-sensitive).
///
/// This is the set spreadsheet and dataframe tooling conventionally treats as
/// NA when reading CSV. `Unknown` is deliberately absent: it is a valid label.
pub const NA_TOKENS: [&str; 18] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#N/A N/A", "#NA", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// Check if a raw cell should be treated as missing.
pub fn is_missing_marker(s: &str) -> bool {
    s.is_empty() || NA_TOKENS.contains(&s)
}

// =============================================================================
// Text Normalization
// =============================================================================

/// Title-case a string: a letter following a non-letter is upper-cased, every
/// other letter is lower-cased.
///
/// ```rust,ignore
/// assert_eq!(title_case("JANTA PARTY (SECULAR)"), "Janta Party (Secular)");
/// assert_eq!(title_case("andaman & nicobar"), "Andaman & Nicobar");
/// ```
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Replace underscores with spaces, then title-case.
pub fn normalize_name(s: &str) -> String {
    title_case(&s.replace('_', " "))
}

// =============================================================================
// Numeric Parsing
// =============================================================================

/// Parse a vote or elector count.
///
/// Surrounding whitespace is ignored. Anything that is not a finite number
/// (including thousands separators and `inf`) yields `None`.
pub fn parse_count(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("JANTA PARTY (SECULAR)"), "Janta Party (Secular)");
        assert_eq!(title_case("andaman & nicobar islands"), "Andaman & Nicobar Islands");
        assert_eq!(title_case("o'brien"), "O'Brien");
        assert_eq!(title_case("1st ward"), "1St Ward");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(
            normalize_name("INDIAN_NATIONAL_CONGRESS"),
            "Indian National Congress"
        );
        assert_eq!(normalize_name("Bharatiya Janata Party"), "Bharatiya Janata Party");
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("NaN"));
        assert!(is_missing_marker("#N/A"));
        assert!(!is_missing_marker("Unknown"));
        assert!(!is_missing_marker("nA"));
        assert!(!is_missing_marker("GEN"));
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("96084"), Some(96084.0));
        assert_eq!(parse_count(" 405.0 "), Some(405.0));
        assert_eq!(parse_count("-3"), Some(-3.0));
        assert_eq!(parse_count("1,234"), None);
        assert_eq!(parse_count("inf"), None);
        assert_eq!(parse_count("abc"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(!is_numeric_dtype(&DataType::String));
    }

    #[test]
    fn test_total_null_count() {
        let df = df![
            "a" => [Some("x"), None],
            "b" => [None::<f64>, None],
        ]
        .unwrap();
        assert_eq!(total_null_count(&df), 3);
    }
}
