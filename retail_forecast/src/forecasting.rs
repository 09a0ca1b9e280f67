//! Recursive multi-step forecasting on top of a single-step regressor
//!
//! Each step synthesizes the next week's feature row from the running
//! history, asks the regressor for one value, and appends that value as
//! the newest observation. Lag and rolling features therefore become
//! autoregressive on the forecaster's own output once the horizon extends
//! past the observed history; a prediction 52 steps out feeds the lag-52
//! feature of week 104 and the compounding is intentional.
//!
//! Missing columns never fail a step: absent features reindex to zero,
//! unusable windows carry the previous value forward, and only a failing
//! regressor call aborts the horizon.

use crate::data::SeriesFrame;
use crate::error::Result;
use crate::features::{LAG_PREFIX, ROLL_PREFIX};
use crate::models::{ForecastResult, Regressor};
use crate::utils::nan_mean;
use chrono::{Datelike, Duration};

/// Forecast `horizon` weekly steps past the end of `series`.
///
/// `series` holds the feature-prepared, time-sorted rows of exactly one
/// (store, dept) series; `feature_columns` is the exact column order the
/// regressor was trained on. The caller's frame is never mutated and the
/// call has no hidden state: identical inputs give identical outputs.
///
/// Callers are responsible for rejecting an empty series and a zero
/// horizon before invoking.
pub fn recursive_forecast(
    series: &SeriesFrame,
    feature_columns: &[String],
    regressor: &dyn Regressor,
    horizon: usize,
) -> Result<ForecastResult> {
    let target_name = series.target_column().to_string();
    let lag1_name = format!("{LAG_PREFIX}1");
    let lag2_name = format!("{LAG_PREFIX}2");
    let lag52_name = format!("{LAG_PREFIX}52");

    // Private working state: the newest row (every feature column carries
    // forward until overwritten) and the full target history, which grows
    // by one prediction per step.
    let mut row: Vec<(String, f64)> = series.last_row()?;
    let mut has_target = series.has_column(&target_name);
    let mut targets: Vec<f64> = if has_target {
        series.target_values()
    } else {
        vec![f64::NAN; series.len()]
    };
    let mut last_date = series.last_date()?;

    // Rolling columns are fixed for the whole horizon; a suffix that is
    // not a number leaves that column carried as-is.
    let roll_columns: Vec<(String, Option<usize>)> = row
        .iter()
        .filter(|(name, _)| name.starts_with(ROLL_PREFIX))
        .map(|(name, _)| {
            let window = name[ROLL_PREFIX.len()..].parse::<usize>().ok();
            (name.clone(), window)
        })
        .collect();

    let mut dates = Vec::with_capacity(horizon);
    let mut values = Vec::with_capacity(horizon);

    for _ in 0..horizon {
        // Strict 7-day cadence from the running maximum timestamp.
        let next_date = last_date + Duration::weeks(1);

        // Calendar fields come from the new date; everything else in the
        // row is still last week's value.
        set_value(&mut row, "week", f64::from(next_date.iso_week().week()));
        set_value(&mut row, "month", f64::from(next_date.month()));
        set_value(&mut row, "year", next_date.year() as f64);

        // Latest observed-or-predicted target. Without a target column the
        // previous row's lag-1 stands in for it.
        let last_y = if has_target {
            targets[targets.len() - 1]
        } else {
            get_value(&row, &lag1_name).unwrap_or(f64::NAN)
        };

        if has_value(&row, &lag1_name) {
            set_value(&mut row, &lag1_name, last_y);
        }
        if has_value(&row, &lag2_name) {
            // Lag-2 tracks the value lag-1 just took in this same row, not
            // a second history lookup.
            let prev_lag1 = get_value(&row, &lag1_name).unwrap_or(last_y);
            set_value(&mut row, &lag2_name, prev_lag1);
        }
        if has_value(&row, &lag52_name) && targets.len() >= 52 {
            let year_back = targets[targets.len() - 52];
            if !year_back.is_nan() {
                set_value(&mut row, &lag52_name, year_back);
            }
        }

        // Rolling means over the trailing window of the (growing) target
        // history; an empty or all-NaN window keeps the carried value.
        for (name, window) in &roll_columns {
            let Some(window) = window else { continue };
            if *window == 0 {
                continue;
            }
            let start = targets.len().saturating_sub(*window);
            if let Some(mean) = nan_mean(&targets[start..]) {
                set_value(&mut row, name, mean);
            }
        }

        // Align onto the training column order; columns the row doesn't
        // have become zero, NaN values in present columns pass through.
        let aligned: Vec<f64> = feature_columns
            .iter()
            .map(|column| get_value(&row, column).unwrap_or(0.0))
            .collect();

        // A failing prediction aborts the whole horizon: it means the
        // model and the features disagree, which must not be masked.
        let prediction = regressor.predict_row(&aligned)?;

        values.push(prediction);
        dates.push(next_date);

        // The prediction joins history as the newest observation.
        set_value(&mut row, &target_name, prediction);
        has_target = true;
        targets.push(prediction);
        last_date = next_date;
    }

    ForecastResult::new(values, horizon)?.with_dates(dates)
}

fn get_value(row: &[(String, f64)], name: &str) -> Option<f64> {
    row.iter()
        .find(|(column, _)| column == name)
        .map(|(_, value)| *value)
}

fn has_value(row: &[(String, f64)], name: &str) -> bool {
    row.iter().any(|(column, _)| column == name)
}

fn set_value(row: &mut Vec<(String, f64)>, name: &str, value: f64) {
    match row.iter_mut().find(|(column, _)| column == name) {
        Some(entry) => entry.1 = value,
        None => row.push((name.to_string(), value)),
    }
}
