//! Frequency tables over categorical columns.

use crate::types::CategoryCount;
use crate::utils::string_column;
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Count the values of a string column, most frequent first.
///
/// Ties keep the order in which the values first appear. Nulls are not
/// counted. `limit` truncates the table.
pub fn value_counts(df: &DataFrame, column: &str, limit: Option<usize>) -> Result<Vec<CategoryCount>> {
    let values = string_column(df, column)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for value in values.into_iter().flatten() {
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(CategoryCount {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(limit) = limit {
        counts.truncate(limit);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn count(label: &str, count: usize) -> CategoryCount {
        CategoryCount {
            label: label.to_string(),
            count,
        }
    }

    #[test]
    fn test_value_counts_sorted_with_stable_ties() {
        let df = df![
            "partyname" => [Some("Ind"), Some("Inc"), Some("Bjp"), None, Some("Inc"), Some("Bjp"), Some("Cpm")],
        ]
        .unwrap();

        let counts = value_counts(&df, "partyname", None).unwrap();

        assert_eq!(
            counts,
            vec![count("Inc", 2), count("Bjp", 2), count("Ind", 1), count("Cpm", 1)]
        );
    }

    #[test]
    fn test_value_counts_limit() {
        let labels: Vec<String> = (0..15).map(|i| format!("Party {i}")).collect();
        let df = df!["partyname" => labels].unwrap();

        let counts = value_counts(&df, "partyname", Some(10)).unwrap();

        assert_eq!(counts.len(), 10);
        assert!(counts.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_value_counts_missing_column() {
        let df = df!["other" => ["x"]].unwrap();
        assert!(value_counts(&df, "partyname", None).is_err());
    }
}
