//! Voter turnout column and the per-state turnout ranking.

use crate::types::{StateTurnout, columns};
use crate::utils::{float_column, string_column};
use anyhow::Result;
use polars::prelude::*;
use std::collections::BTreeMap;

/// Turnout percentage for a single row.
///
/// Not guarded: zero electors yield an infinite or NaN turnout.
#[inline]
pub fn voter_turnout(votes: f64, electors: f64) -> f64 {
    votes / electors * 100.0
}

/// Add `voter_turnout = totvotpoll / electors * 100`.
///
/// Rows where either count is missing get a missing turnout.
pub fn add_voter_turnout(df: DataFrame) -> Result<DataFrame> {
    let mut df = df;
    let votes = float_column(&df, columns::TOTVOTPOLL)?;
    let electors = float_column(&df, columns::ELECTORS)?;

    let turnout: Vec<Option<f64>> = votes
        .into_iter()
        .zip(electors.into_iter())
        .map(|(v, e)| match (v, e) {
            (Some(v), Some(e)) => Some(voter_turnout(v, e)),
            _ => None,
        })
        .collect();

    df.with_column(Series::new(columns::VOTER_TURNOUT.into(), turnout))?;
    Ok(df)
}

/// Mean finite turnout per state, highest first, truncated to `limit`.
///
/// Non-finite turnouts are left out of the mean; states without any finite
/// turnout are left out entirely. Equal means are ordered by state name.
pub fn top_states_by_turnout(df: &DataFrame, limit: usize) -> Result<Vec<StateTurnout>> {
    let states = string_column(df, columns::ST_NAME)?;
    let turnout = float_column(df, columns::VOTER_TURNOUT)?;

    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for (state, value) in states.into_iter().zip(turnout.into_iter()) {
        if let (Some(state), Some(value)) = (state, value)
            && value.is_finite()
        {
            let entry = sums.entry(state).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    let mut ranking: Vec<StateTurnout> = sums
        .into_iter()
        .map(|(state, (sum, rows))| StateTurnout {
            state: state.to_string(),
            mean_turnout: sum / rows as f64,
            rows,
        })
        .collect();

    // stable: ties stay in name order
    ranking.sort_by(|a, b| b.mean_turnout.total_cmp(&a.mean_turnout));
    ranking.truncate(limit);
    Ok(ranking)
}
