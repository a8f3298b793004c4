//! Winning margin column.
//!
//! [`MarginStrategy::Sequential`] reproduces the historical column: the vote
//! difference to the previous row of the same constituency. It is not an
//! electoral margin and depends on row order. [`MarginStrategy::RunnerUp`]
//! computes winner minus runner-up per contest.

use crate::config::MarginStrategy;
use crate::types::columns;
use crate::utils::{float_column, string_column};
use anyhow::Result;
use polars::prelude::*;
use std::collections::HashMap;

/// Add the `winning_margin` column using `strategy`.
pub fn add_winning_margin(df: DataFrame, strategy: MarginStrategy) -> Result<DataFrame> {
    let mut df = df;
    let margins = match strategy {
        MarginStrategy::Sequential => sequential_margins(&df)?,
        MarginStrategy::RunnerUp => runner_up_margins(&df)?,
    };
    df.with_column(Series::new(columns::WINNING_MARGIN.into(), margins))?;
    Ok(df)
}

/// Absolute difference to the previous row of the same `pc_name`.
///
/// The first row of each constituency, and any row where either value is
/// missing, gets 0.
fn sequential_margins(df: &DataFrame) -> Result<Vec<Option<f64>>> {
    let names = string_column(df, columns::PC_NAME)?;
    let votes = float_column(df, columns::TOTVOTPOLL)?;

    let mut previous: HashMap<&str, Option<f64>> = HashMap::new();
    let margins = names
        .into_iter()
        .zip(votes.into_iter())
        .map(|(name, current)| {
            let Some(name) = name else {
                return Some(0.0);
            };
            let margin = match (previous.insert(name, current), current) {
                (Some(Some(prev)), Some(cur)) => (cur - prev).abs(),
                _ => 0.0,
            };
            Some(margin)
        })
        .collect();

    Ok(margins)
}

/// Winner minus runner-up per (state, year, constituency).
///
/// Only the winner's row carries the margin; every other row is missing. An
/// unopposed winner's margin is its own vote total. Ties go to the first row.
fn runner_up_margins(df: &DataFrame) -> Result<Vec<Option<f64>>> {
    let states = string_column(df, columns::ST_NAME)?;
    let years = string_column(df, columns::YEAR)?;
    let names = string_column(df, columns::PC_NAME)?;
    let votes = float_column(df, columns::TOTVOTPOLL)?;

    // (winner row, winner votes, runner-up votes)
    let mut contests: HashMap<(&str, &str, &str), (usize, f64, Option<f64>)> = HashMap::new();

    for (row, (((state, year), name), vote)) in states
        .into_iter()
        .zip(years.into_iter())
        .zip(names.into_iter())
        .zip(votes.into_iter())
        .enumerate()
    {
        let (Some(state), Some(year), Some(name), Some(vote)) = (state, year, name, vote) else {
            continue;
        };

        contests
            .entry((state, year, name))
            .and_modify(|(winner_row, best, second)| {
                if vote > *best {
                    *second = Some(*best);
                    *best = vote;
                    *winner_row = row;
                } else if second.is_none_or(|s| vote > s) {
                    *second = Some(vote);
                }
            })
            .or_insert((row, vote, None));
    }

    let mut margins = vec![None; df.height()];
    for (winner_row, best, second) in contests.into_values() {
        margins[winner_row] = Some(best - second.unwrap_or(0.0));
    }
    Ok(margins)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn margins(df: &DataFrame) -> Vec<Option<f64>> {
        float_column(df, "winning_margin")
            .unwrap()
            .into_iter()
            .collect()
    }

    fn contest_table() -> DataFrame {
        df![
            "st_name" => ["Kerala", "Kerala", "Goa", "Kerala", "Kerala", "Kerala"],
            "year" => ["1977", "1977", "1977", "1977", "1980", "1980"],
            "pc_name" => ["Kasaragod", "Kasaragod", "Panaji", "Kasaragod", "Kasaragod", "Kasaragod"],
            "totvotpoll" => [1000.0, 600.0, 50.0, 200.0, 300.0, 900.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_sequential_margin_single_group() {
        let df = df![
            "pc_name" => ["Kasaragod", "Kasaragod", "Kasaragod"],
            "totvotpoll" => [1000.0, 600.0, 200.0],
        ]
        .unwrap();

        let df = add_winning_margin(df, MarginStrategy::Sequential).unwrap();
        assert_eq!(margins(&df), vec![Some(0.0), Some(400.0), Some(400.0)]);
    }

    #[test]
    fn test_sequential_margin_interleaved_groups() {
        let df = add_winning_margin(contest_table(), MarginStrategy::Sequential).unwrap();
        // grouping is by constituency name only, across years
        assert_eq!(
            margins(&df),
            vec![Some(0.0), Some(400.0), Some(0.0), Some(400.0), Some(100.0), Some(600.0)]
        );
    }

    #[test]
    fn test_sequential_margin_missing_votes() {
        let df = df![
            "pc_name" => ["A", "A", "A"],
            "totvotpoll" => [Some(10.0), None, Some(4.0)],
        ]
        .unwrap();

        let df = add_winning_margin(df, MarginStrategy::Sequential).unwrap();
        assert_eq!(margins(&df), vec![Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_runner_up_margin() {
        let df = add_winning_margin(contest_table(), MarginStrategy::RunnerUp).unwrap();
        assert_eq!(
            margins(&df),
            vec![Some(400.0), None, Some(50.0), None, None, Some(600.0)]
        );
    }
}
