//! Model comparison over a common holdout: the leaderboard

use crate::baselines::{evaluate_naives, holdout_cutoff};
use crate::data::SalesSeries;
use crate::error::Result;
use crate::features::{build_features, FeatureConfig};
use crate::metrics::{mean_absolute_error, wmae};
use crate::models::random_forest::{ForestConfig, RandomForest};
use crate::models::sarima::Sarima;
use crate::models::seasonal_trend::SeasonalTrend;
use crate::models::{Regressor, SeriesModel, TrainedSeriesModel};
use retail_data::{MergedRecord, SeriesKey};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Minimum observations a series needs before the per-series classical
/// models are attempted on it.
pub const MIN_SERIES_HISTORY: usize = 60;

/// Configuration for a leaderboard run
#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    /// Weeks held out at the end of the data for scoring
    pub holdout_weeks: i64,
    /// How many high-volume series get per-series model rows
    pub top_series: usize,
    /// Feature construction for the global regressor
    pub features: FeatureConfig,
    /// Global random forest hyperparameters
    pub forest: ForestConfig,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            holdout_weeks: 8,
            top_series: 10,
            features: FeatureConfig::default(),
            forest: ForestConfig::default(),
        }
    }
}

/// One leaderboard entry
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRow {
    pub model: String,
    pub scope: String,
    pub rows: usize,
    pub mae: f64,
    pub wmae: f64,
    pub notes: String,
}

/// Rank series by mean sales, largest first, ties broken by key.
pub fn top_series(records: &[MergedRecord], n: usize) -> Vec<(SeriesKey, f64)> {
    let mut sums: HashMap<SeriesKey, (f64, usize)> = HashMap::new();
    for record in records {
        let entry = sums.entry(record.key()).or_insert((0.0, 0));
        entry.0 += record.weekly_sales;
        entry.1 += 1;
    }
    let mut ranked: Vec<(SeriesKey, f64)> = sums
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count.max(1) as f64))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.truncate(n);
    ranked
}

/// Compare the naive baselines, the global forest and the per-series
/// classical models on one shared holdout window.
///
/// Per-series fits that fail (short history, degenerate fit) are skipped
/// with a warning rather than failing the whole run.
pub fn leaderboard(
    records: &[MergedRecord],
    config: &EvaluateConfig,
) -> Result<Vec<LeaderboardRow>> {
    let mut out = Vec::new();

    for report in evaluate_naives(records, config.holdout_weeks)? {
        out.push(LeaderboardRow {
            model: report.name,
            scope: "all rows (holdout)".to_string(),
            rows: report.rows,
            mae: report.mae,
            wmae: report.wmae,
            notes: "baseline".to_string(),
        });
    }

    let cutoff = holdout_cutoff(records, config.holdout_weeks)?;

    // Global forest scored row-by-row on the holdout feature rows.
    let features = build_features(records, &config.features)?;
    let matrix = features.training_matrix()?;
    let mut x_train = Vec::new();
    let mut y_train = Vec::new();
    let mut train_sums: HashMap<SeriesKey, (f64, usize)> = HashMap::new();
    let mut x_test = Vec::new();
    let mut y_test = Vec::new();
    let mut test_keys = Vec::new();
    for i in 0..matrix.x.len() {
        if matrix.dates[i] <= cutoff {
            let entry = train_sums.entry(matrix.keys[i]).or_insert((0.0, 0));
            entry.0 += matrix.y[i];
            entry.1 += 1;
            x_train.push(matrix.x[i].clone());
            y_train.push(matrix.y[i]);
        } else {
            x_test.push(matrix.x[i].clone());
            y_test.push(matrix.y[i]);
            test_keys.push(matrix.keys[i]);
        }
    }

    if x_train.is_empty() || x_test.is_empty() {
        warn!(
            train_rows = x_train.len(),
            test_rows = x_test.len(),
            "skipping global forest: empty split"
        );
    } else {
        let forest = RandomForest::new(config.forest.clone()).fit(&x_train, &y_train)?;
        let mut forecast = Vec::with_capacity(x_test.len());
        for row in &x_test {
            forecast.push(forest.predict_row(row)?);
        }
        let train_mean = y_train.iter().sum::<f64>() / y_train.len() as f64;
        let weights: Vec<f64> = test_keys
            .iter()
            .map(|key| {
                train_sums
                    .get(key)
                    .map(|(sum, count)| sum / (*count).max(1) as f64)
                    .unwrap_or(train_mean)
            })
            .collect();
        out.push(LeaderboardRow {
            model: "global random forest".to_string(),
            scope: "all rows (holdout)".to_string(),
            rows: y_test.len(),
            mae: mean_absolute_error(&y_test, &forecast)?,
            wmae: wmae(&y_test, &forecast, &weights)?,
            notes: format!("{} trees", forest.n_trees()),
        });
    }

    // Per-series classical models on the highest-volume series.
    for (key, _) in top_series(records, config.top_series) {
        let series = match SalesSeries::from_records(records, key) {
            Ok(series) => series,
            Err(_) => continue,
        };
        if series.len() < MIN_SERIES_HISTORY {
            debug!(%key, length = series.len(), "series too short for classical models");
            continue;
        }
        let split = series
            .dates
            .iter()
            .position(|date| *date > cutoff)
            .unwrap_or(series.len());
        if split == 0 || split == series.len() {
            continue;
        }
        let train = SalesSeries {
            dates: series.dates[..split].to_vec(),
            values: series.values[..split].to_vec(),
        };
        let actual = &series.values[split..];
        let weight = train.mean();
        let scope = key.to_string();

        if let Some(row) = series_row(&Sarima::weekly_default(), &train, actual, weight, &scope) {
            out.push(row);
        }
        if let Some(row) = series_row(&SeasonalTrend::weekly(), &train, actual, weight, &scope) {
            out.push(row);
        }
    }

    out.sort_by(|a, b| {
        a.scope
            .cmp(&b.scope)
            .then_with(|| a.wmae.partial_cmp(&b.wmae).unwrap_or(Ordering::Equal))
            .then_with(|| a.mae.partial_cmp(&b.mae).unwrap_or(Ordering::Equal))
    });
    Ok(out)
}

fn series_row<M: SeriesModel>(
    model: &M,
    train: &SalesSeries,
    actual: &[f64],
    weight: f64,
    scope: &str,
) -> Option<LeaderboardRow> {
    let outcome = model
        .train(train)
        .and_then(|trained| trained.forecast(actual.len()));
    match outcome {
        Ok(result) => {
            let weights = vec![weight; actual.len()];
            let mae = mean_absolute_error(actual, result.values()).ok()?;
            let wmae = wmae(actual, result.values(), &weights).ok()?;
            Some(LeaderboardRow {
                model: model.name().to_string(),
                scope: scope.to_string(),
                rows: actual.len(),
                mae,
                wmae,
                notes: "per-series".to_string(),
            })
        }
        Err(error) => {
            warn!(scope, model = model.name(), %error, "series model failed; skipping");
            None
        }
    }
}

/// Write leaderboard rows as CSV.
pub fn write_leaderboard_csv<P: AsRef<Path>>(
    path: P,
    rows: &[LeaderboardRow],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
