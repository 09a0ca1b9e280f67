//! Naive per-series baselines over a time holdout
//!
//! Any model worth serving has to beat last week's value and last year's
//! value; these two reports are the floor every leaderboard includes.

use crate::error::{ForecastError, Result};
use crate::metrics::{mean_absolute_error, wmae};
use chrono::{Duration, NaiveDate};
use retail_data::{MergedRecord, SeriesKey};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Accuracy of one naive baseline on the holdout rows
#[derive(Debug, Clone, Serialize)]
pub struct BaselineReport {
    pub name: String,
    pub rows: usize,
    pub mae: f64,
    pub wmae: f64,
}

/// The holdout boundary: every row dated after this belongs to the test
/// window.
pub fn holdout_cutoff(records: &[MergedRecord], holdout_weeks: i64) -> Result<NaiveDate> {
    let max_date = records
        .iter()
        .map(|r| r.date)
        .max()
        .ok_or_else(|| ForecastError::DataError("no records to evaluate".to_string()))?;
    Ok(max_date - Duration::weeks(holdout_weeks))
}

/// Evaluate the one-week and one-year naive baselines on the holdout.
///
/// WMAE weights are per-series mean sales over the training window; series
/// without training rows fall back to the mean holdout sales. A baseline
/// with no scoreable holdout rows (every lag missing) is omitted.
pub fn evaluate_naives(
    records: &[MergedRecord],
    holdout_weeks: i64,
) -> Result<Vec<BaselineReport>> {
    let cutoff = holdout_cutoff(records, holdout_weeks)?;

    let mut groups: BTreeMap<SeriesKey, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.key())
            .or_default()
            .push((record.date, record.weekly_sales));
    }

    let mut train_means: HashMap<SeriesKey, f64> = HashMap::new();
    // (key, actual, lag1, lag52) per holdout row
    let mut holdout_rows: Vec<(SeriesKey, f64, Option<f64>, Option<f64>)> = Vec::new();

    for (key, mut rows) in groups {
        rows.sort_by_key(|(date, _)| *date);
        let values: Vec<f64> = rows.iter().map(|(_, v)| *v).collect();

        let train_values: Vec<f64> = rows
            .iter()
            .filter(|(date, _)| *date <= cutoff)
            .map(|(_, v)| *v)
            .collect();
        if !train_values.is_empty() {
            train_means.insert(
                key,
                train_values.iter().sum::<f64>() / train_values.len() as f64,
            );
        }

        for (i, (date, actual)) in rows.iter().enumerate() {
            if *date <= cutoff {
                continue;
            }
            let lag1 = (i >= 1).then(|| values[i - 1]);
            let lag52 = (i >= 52).then(|| values[i - 52]);
            holdout_rows.push((key, *actual, lag1, lag52));
        }
    }

    if holdout_rows.is_empty() {
        return Err(ForecastError::DataError(
            "holdout window contains no rows".to_string(),
        ));
    }
    let fallback_weight = holdout_rows.iter().map(|(_, a, _, _)| *a).sum::<f64>()
        / holdout_rows.len() as f64;

    let mut reports = Vec::new();
    let baselines: [(&str, fn(&(SeriesKey, f64, Option<f64>, Option<f64>)) -> Option<f64>); 2] = [
        ("naive (1w)", |row| row.2),
        ("seasonal naive (52w)", |row| row.3),
    ];
    for (name, select) in baselines {
        let mut actual = Vec::new();
        let mut forecast = Vec::new();
        let mut weights = Vec::new();
        for row in &holdout_rows {
            let Some(predicted) = select(row) else { continue };
            actual.push(row.1);
            forecast.push(predicted);
            weights.push(*train_means.get(&row.0).unwrap_or(&fallback_weight));
        }
        if actual.is_empty() {
            debug!(baseline = name, "no scoreable holdout rows; omitting");
            continue;
        }
        reports.push(BaselineReport {
            name: name.to_string(),
            rows: actual.len(),
            mae: mean_absolute_error(&actual, &forecast)?,
            wmae: wmae(&actual, &forecast, &weights)?,
        });
    }
    Ok(reports)
}
